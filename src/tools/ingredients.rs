//! Ingredient MCP Tools
//!
//! Tools for managing ingredients in the database.

use serde::Serialize;

use super::categories::CategorySummary;
use super::{id_string, parse_id, DeleteResponse};
use crate::db::{categories, ingredients, Database, DbError};
use crate::models::{Category, Ingredient, Nutrition};

/// Summary of an ingredient for list results
#[derive(Debug, Serialize)]
pub struct IngredientSummary {
    pub id: Option<String>,
    pub name: String,
    pub category: String,
    pub calories: f64,
}

impl From<&Ingredient> for IngredientSummary {
    fn from(ingredient: &Ingredient) -> Self {
        Self {
            id: id_string(ingredient.id()),
            name: ingredient.name().to_string(),
            category: ingredient.category().name().to_string(),
            calories: ingredient.calories(),
        }
    }
}

/// Full ingredient detail, nutrients per 100 g
#[derive(Debug, Serialize)]
pub struct IngredientDetail {
    pub id: Option<String>,
    pub name: String,
    pub per_100g: Nutrition,
    pub category: CategorySummary,
    pub usage_count: Option<i64>,
}

impl IngredientDetail {
    pub fn from_ingredient(ingredient: &Ingredient, usage_count: Option<i64>) -> Self {
        Self {
            id: id_string(ingredient.id()),
            name: ingredient.name().to_string(),
            per_100g: ingredient.nutrition(),
            category: CategorySummary::from(ingredient.category()),
            usage_count,
        }
    }
}

/// Response for list_ingredients
#[derive(Debug, Serialize)]
pub struct ListIngredientsResponse {
    pub items: Vec<IngredientSummary>,
    pub total: usize,
}

/// Fields to change on an ingredient; absent fields are left alone
#[derive(Debug, Default)]
pub struct IngredientChanges {
    pub name: Option<String>,
    pub fat: Option<f64>,
    pub carbohydrates: Option<f64>,
    pub protein: Option<f64>,
    pub calories: Option<f64>,
    pub category_id: Option<String>,
}

/// Response for update_ingredient
#[derive(Debug, Serialize)]
pub struct UpdateIngredientResponse {
    pub ingredient: IngredientDetail,
    /// Fields whose new value was invalid and therefore ignored
    pub rejected: Vec<&'static str>,
}

fn load_category(db: &Database, id: &str) -> Result<Category, String> {
    let id = parse_id(id, "category")?;
    db.with_conn(|conn| categories::get_by_id(conn, id))
        .map_err(|e| format!("Failed to get category: {}", e))?
        .ok_or_else(|| format!("Category not found with id: {}", id))
}

/// Add a new ingredient
pub fn add_ingredient(
    db: &Database,
    name: &str,
    per_100g: Nutrition,
    category_id: &str,
) -> Result<IngredientDetail, String> {
    let category = load_category(db, category_id)?;
    let ingredient = Ingredient::new(
        name,
        per_100g.fat,
        per_100g.carbohydrates,
        per_100g.protein,
        per_100g.calories,
        category,
    )
    .map_err(|e| e.to_string())?;

    let saved = db
        .with_conn(|conn| ingredients::insert(conn, &ingredient))
        .map_err(|e| format!("Failed to create ingredient: {}", e))?;

    Ok(IngredientDetail::from_ingredient(&saved, Some(0)))
}

/// Get an ingredient with its usage count
pub fn get_ingredient(db: &Database, id: &str) -> Result<Option<IngredientDetail>, String> {
    let id = parse_id(id, "ingredient")?;

    db.with_conn(|conn| {
        let Some(ingredient) = ingredients::get_by_id(conn, id)? else {
            return Ok(None);
        };
        let usage_count = ingredients::get_usage_count(conn, id)?;
        Ok(Some(IngredientDetail::from_ingredient(&ingredient, Some(usage_count))))
    })
    .map_err(|e| format!("Failed to get ingredient: {}", e))
}

/// List ingredients, optionally within a category
pub fn list_ingredients(db: &Database, category_id: Option<&str>) -> Result<ListIngredientsResponse, String> {
    let category_id = category_id.map(|id| parse_id(id, "category")).transpose()?;

    let items = db
        .with_conn(|conn| ingredients::list(conn, category_id))
        .map_err(|e| format!("Failed to list ingredients: {}", e))?;

    let items: Vec<IngredientSummary> = items.iter().map(IngredientSummary::from).collect();
    let total = items.len();
    Ok(ListIngredientsResponse { items, total })
}

/// Update an ingredient through its setters. Invalid values are skipped and reported.
pub fn update_ingredient(
    db: &Database,
    id: &str,
    changes: IngredientChanges,
) -> Result<UpdateIngredientResponse, String> {
    let id = parse_id(id, "ingredient")?;

    let mut ingredient = db
        .with_conn(|conn| ingredients::get_by_id(conn, id))
        .map_err(|e| format!("Failed to get ingredient: {}", e))?
        .ok_or_else(|| format!("Ingredient not found with id: {}", id))?;

    let mut rejected = Vec::new();
    if let Some(name) = &changes.name {
        if !ingredient.set_name(name) {
            rejected.push("name");
        }
    }
    if let Some(fat) = changes.fat {
        if !ingredient.set_fat(fat) {
            rejected.push("fat");
        }
    }
    if let Some(carbohydrates) = changes.carbohydrates {
        if !ingredient.set_carbohydrates(carbohydrates) {
            rejected.push("carbohydrates");
        }
    }
    if let Some(protein) = changes.protein {
        if !ingredient.set_protein(protein) {
            rejected.push("protein");
        }
    }
    if let Some(calories) = changes.calories {
        if !ingredient.set_calories(calories) {
            rejected.push("calories");
        }
    }
    if let Some(category_id) = &changes.category_id {
        ingredient.set_category(Some(load_category(db, category_id)?));
    }

    let updated = db
        .with_conn(|conn| ingredients::update(conn, &ingredient))
        .map_err(|e| format!("Failed to update ingredient: {}", e))?
        .ok_or_else(|| format!("Ingredient not found with id: {}", id))?;

    Ok(UpdateIngredientResponse {
        ingredient: IngredientDetail::from_ingredient(&updated, None),
        rejected,
    })
}

/// Delete an ingredient (only allowed if no recipe or daily intake uses it)
pub fn delete_ingredient(db: &Database, id: &str) -> Result<DeleteResponse, String> {
    let id = parse_id(id, "ingredient")?;

    let deleted = db.with_conn(|conn| ingredients::delete(conn, id)).map_err(|e| match e {
        DbError::InUse { count, .. } => format!(
            "Cannot delete ingredient {}: used {} time(s) in recipes or daily intakes",
            id, count
        ),
        other => format!("Failed to delete ingredient: {}", other),
    })?;

    if !deleted {
        return Err(format!("Ingredient not found with id: {}", id));
    }
    Ok(DeleteResponse {
        success: true,
        deleted_id: id.to_string(),
    })
}
