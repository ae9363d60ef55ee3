//! Recipe MCP Tools
//!
//! Tools for creating, inspecting and reconciling recipes.

use std::collections::HashMap;

use rmcp::schemars;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::categories::CategorySummary;
use super::{id_string, parse_id, DeleteResponse};
use crate::db::{categories, ingredients, recipes, Database, DbError};
use crate::models::{
    Category, Ingredient, IngredientMeasurement, MeasurementUnit, Nutrition, Recipe,
};

/// One ingredient line of a recipe as submitted by a client
#[derive(Debug, Clone, Deserialize, schemars::JsonSchema)]
pub struct MeasurementInput {
    /// Id of an existing measurement (update_recipe only); omit for new lines
    pub id: Option<String>,
    pub ingredient_id: String,
    pub measurement: f64,
    /// gram, hectogram, kilogram, spice_measurement, teaspoon, tablespoon,
    /// milliliters, centiliters, deciliters, liter, piece, small, big, clove
    pub unit: String,
    pub grams: f64,
    pub note: String,
    /// Defaults to the position in the list
    pub sort_order: Option<i32>,
}

/// Measurement line in a recipe detail
#[derive(Debug, Serialize)]
pub struct MeasurementDetail {
    pub id: Option<String>,
    pub ingredient_id: Option<String>,
    pub ingredient_name: String,
    pub measurement: f64,
    pub unit: MeasurementUnit,
    pub grams: f64,
    pub note: String,
    pub sort_order: i32,
    pub nutrition: Nutrition,
}

impl From<&IngredientMeasurement> for MeasurementDetail {
    fn from(m: &IngredientMeasurement) -> Self {
        Self {
            id: id_string(m.id()),
            ingredient_id: id_string(m.ingredient_id()),
            ingredient_name: m.ingredient().name().to_string(),
            measurement: m.measurement(),
            unit: m.unit(),
            grams: m.grams(),
            note: m.note().to_string(),
            sort_order: m.sort_order(),
            nutrition: m.nutrition(),
        }
    }
}

/// Full recipe detail with aggregated nutrition
#[derive(Debug, Serialize)]
pub struct RecipeDetail {
    pub id: Option<String>,
    pub name: String,
    pub instructions: String,
    pub portion_amount: i32,
    pub category: CategorySummary,
    pub measurements: Vec<MeasurementDetail>,
    pub total: Nutrition,
    pub per_portion: Nutrition,
}

impl From<&Recipe> for RecipeDetail {
    fn from(recipe: &Recipe) -> Self {
        let total = recipe.nutrition();
        Self {
            id: id_string(recipe.id()),
            name: recipe.name().to_string(),
            instructions: recipe.instructions().to_string(),
            portion_amount: recipe.portion_amount(),
            category: CategorySummary::from(recipe.category()),
            measurements: recipe.measurements().iter().map(MeasurementDetail::from).collect(),
            total,
            per_portion: total.scale(1.0 / f64::from(recipe.portion_amount().max(1))),
        }
    }
}

/// Summary of a recipe for list results
#[derive(Debug, Serialize)]
pub struct RecipeSummary {
    pub id: Option<String>,
    pub name: String,
    pub category: String,
    pub portion_amount: i32,
    pub ingredient_count: usize,
    pub calories: f64,
}

impl From<&Recipe> for RecipeSummary {
    fn from(recipe: &Recipe) -> Self {
        Self {
            id: id_string(recipe.id()),
            name: recipe.name().to_string(),
            category: recipe.category().name().to_string(),
            portion_amount: recipe.portion_amount(),
            ingredient_count: recipe.measurements().len(),
            calories: recipe.calorie_amount(),
        }
    }
}

/// Response for list_recipes
#[derive(Debug, Serialize)]
pub struct ListRecipesResponse {
    pub items: Vec<RecipeSummary>,
    pub total: usize,
}

/// Response for update_recipe
#[derive(Debug, Serialize)]
pub struct UpdateRecipeResponse {
    pub recipe: RecipeDetail,
    pub measurements_updated: usize,
    pub measurements_deleted: usize,
    pub measurements_inserted: usize,
}

/// Requested recipe state for update_recipe; absent fields keep their current value
#[derive(Debug, Default)]
pub struct RecipeChangesInput {
    pub name: Option<String>,
    pub instructions: Option<String>,
    pub portion_amount: Option<i32>,
    pub category_id: Option<String>,
    /// The complete new list of measurements, if it changes
    pub measurements: Option<Vec<MeasurementInput>>,
}

fn load_category(db: &Database, id: &str) -> Result<Category, String> {
    let id = parse_id(id, "category")?;
    db.with_conn(|conn| categories::get_by_id(conn, id))
        .map_err(|e| format!("Failed to get category: {}", e))?
        .ok_or_else(|| format!("Category not found with id: {}", id))
}

fn load_ingredients(db: &Database, inputs: &[MeasurementInput]) -> Result<HashMap<Uuid, Ingredient>, String> {
    let ids = inputs
        .iter()
        .map(|input| parse_id(&input.ingredient_id, "ingredient"))
        .collect::<Result<Vec<_>, _>>()?;
    db.with_conn(|conn| ingredients::get_many(conn, &ids))
        .map_err(|e| format!("Failed to load ingredients: {}", e))
}

/// Build measurements from client input and add them to `recipe`
fn add_measurements(
    recipe: &mut Recipe,
    inputs: &[MeasurementInput],
    ingredients: &HashMap<Uuid, Ingredient>,
    allow_ids: bool,
) -> Result<(), String> {
    for (index, input) in inputs.iter().enumerate() {
        let ingredient_id = parse_id(&input.ingredient_id, "ingredient")?;
        let ingredient = ingredients
            .get(&ingredient_id)
            .cloned()
            .ok_or_else(|| format!("Ingredient not found with id: {}", ingredient_id))?;
        let unit = MeasurementUnit::from_str(&input.unit)
            .ok_or_else(|| format!("Unknown measurement unit '{}'", input.unit))?;
        let sort_order = match input.sort_order {
            Some(sort_order) => sort_order,
            None => i32::try_from(index).map_err(|_| "Too many measurements".to_string())?,
        };

        let mut measurement =
            IngredientMeasurement::new(input.measurement, unit, input.grams, &input.note, sort_order, ingredient)
                .map_err(|e| format!("Measurement {}: {}", index + 1, e))?;

        if let Some(id) = &input.id {
            if !allow_ids {
                return Err("Measurement ids are only accepted by update_recipe".to_string());
            }
            measurement.assign_id(parse_id(id, "measurement")?);
        }

        if !recipe.add_measurement(measurement) {
            return Err(format!(
                "Ingredient '{}' is listed more than once",
                ingredients
                    .get(&ingredient_id)
                    .map(|i| i.name())
                    .unwrap_or_default()
            ));
        }
    }
    Ok(())
}

/// Create a recipe with its measurements
pub fn create_recipe(
    db: &Database,
    name: &str,
    instructions: &str,
    portion_amount: i32,
    category_id: &str,
    measurements: &[MeasurementInput],
) -> Result<RecipeDetail, String> {
    let category = load_category(db, category_id)?;
    let mut recipe = Recipe::new(name, instructions, portion_amount, category).map_err(|e| e.to_string())?;

    let ingredients = load_ingredients(db, measurements)?;
    add_measurements(&mut recipe, measurements, &ingredients, false)?;

    let saved = db
        .with_conn_mut(|conn| recipes::insert(conn, &recipe))
        .map_err(|e| format!("Failed to create recipe: {}", e))?;

    Ok(RecipeDetail::from(&saved))
}

pub fn get_recipe(db: &Database, id: &str) -> Result<Option<RecipeDetail>, String> {
    let id = parse_id(id, "recipe")?;

    let recipe = db
        .with_conn(|conn| recipes::get_by_id(conn, id))
        .map_err(|e| format!("Failed to get recipe: {}", e))?;

    Ok(recipe.as_ref().map(RecipeDetail::from))
}

/// List recipes, optionally within a category
pub fn list_recipes(db: &Database, category_id: Option<&str>) -> Result<ListRecipesResponse, String> {
    let category_id = category_id.map(|id| parse_id(id, "category")).transpose()?;

    let items = db
        .with_conn(|conn| recipes::list(conn, category_id))
        .map_err(|e| format!("Failed to list recipes: {}", e))?;

    let items: Vec<RecipeSummary> = items.iter().map(RecipeSummary::from).collect();
    let total = items.len();
    Ok(ListRecipesResponse { items, total })
}

/// Update a recipe by reconciling it with the requested state.
///
/// Measurements with an id update the existing line, measurements without one
/// are added, and existing lines missing from the list are removed.
pub fn update_recipe(db: &Database, id: &str, input: RecipeChangesInput) -> Result<UpdateRecipeResponse, String> {
    let id = parse_id(id, "recipe")?;

    let current = db
        .with_conn(|conn| recipes::get_by_id(conn, id))
        .map_err(|e| format!("Failed to get recipe: {}", e))?
        .ok_or_else(|| format!("Recipe not found with id: {}", id))?;

    let category = match &input.category_id {
        Some(category_id) => load_category(db, category_id)?,
        None => current.category().clone(),
    };
    let mut desired = Recipe::new(
        input.name.as_deref().unwrap_or(current.name()),
        input.instructions.as_deref().unwrap_or(current.instructions()),
        input.portion_amount.unwrap_or(current.portion_amount()),
        category,
    )
    .map_err(|e| e.to_string())?
    .with_id(id);

    match &input.measurements {
        Some(measurements) => {
            let ingredients = load_ingredients(db, measurements)?;
            add_measurements(&mut desired, measurements, &ingredients, true)?;
        }
        None => {
            for measurement in current.measurements() {
                desired.add_measurement(measurement.clone());
            }
        }
    }

    let (recipe, changes) = db
        .with_conn_mut(|conn| recipes::update(conn, &desired))
        .map_err(|e| format!("Failed to update recipe: {}", e))?
        .ok_or_else(|| format!("Recipe not found with id: {}", id))?;

    Ok(UpdateRecipeResponse {
        recipe: RecipeDetail::from(&recipe),
        measurements_updated: changes.updated.len(),
        measurements_deleted: changes.deleted.len(),
        measurements_inserted: changes.inserted.len(),
    })
}

/// Delete a recipe (only allowed if no daily intake logs it)
pub fn delete_recipe(db: &Database, id: &str) -> Result<DeleteResponse, String> {
    let id = parse_id(id, "recipe")?;

    let deleted = db.with_conn(|conn| recipes::delete(conn, id)).map_err(|e| match e {
        DbError::InUse { count, .. } => format!(
            "Cannot delete recipe {}: logged {} time(s) in daily intakes",
            id, count
        ),
        other => format!("Failed to delete recipe: {}", other),
    })?;

    if !deleted {
        return Err(format!("Recipe not found with id: {}", id));
    }
    Ok(DeleteResponse {
        success: true,
        deleted_id: id.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::categories::create_category;
    use crate::tools::ingredients::add_ingredient;
    use crate::tools::test_database;

    struct Setup {
        db: Database,
        lunch: String,
        bread: String,
        tuna: String,
        mayo: String,
    }

    fn setup() -> Setup {
        let db = test_database();
        let pantry = create_category(&db, "Pantry", "ingredient", 0).unwrap().id.unwrap();
        let lunch = create_category(&db, "Lunch", "recipe", 0).unwrap().id.unwrap();
        let add = |name: &str, calories: f64| {
            let per_100g = Nutrition { fat: 1.0, carbohydrates: 1.0, protein: 1.0, calories };
            add_ingredient(&db, name, per_100g, &pantry).unwrap().id.unwrap()
        };
        let bread = add("Bread", 260.0);
        let tuna = add("Tuna", 120.0);
        let mayo = add("Mayonnaise", 680.0);
        Setup { db, lunch, bread, tuna, mayo }
    }

    fn line(ingredient_id: &str, grams: f64) -> MeasurementInput {
        MeasurementInput {
            id: None,
            ingredient_id: ingredient_id.to_string(),
            measurement: grams,
            unit: "gram".to_string(),
            grams,
            note: "Fresh".to_string(),
            sort_order: None,
        }
    }

    #[test]
    fn test_create_recipe_with_totals() {
        let s = setup();
        let detail = create_recipe(
            &s.db,
            "Tuna Sandwich",
            "Stack it",
            2,
            &s.lunch,
            &[line(&s.bread, 100.0), line(&s.tuna, 100.0)],
        )
        .unwrap();
        assert_eq!(detail.measurements.len(), 2);
        assert!((detail.total.calories - 380.0).abs() < 1e-9);
        assert!((detail.per_portion.calories - 190.0).abs() < 1e-9);
        assert_eq!(detail.measurements[1].sort_order, 1);
    }

    #[test]
    fn test_create_recipe_rejects_bad_input() {
        let s = setup();
        let duplicate = [line(&s.tuna, 10.0), line(&s.tuna, 20.0)];
        assert!(create_recipe(&s.db, "Double", "Twice", 1, &s.lunch, &duplicate).is_err());

        let mut cup = line(&s.tuna, 10.0);
        cup.unit = "cup".to_string();
        assert!(create_recipe(&s.db, "Cup", "Pour", 1, &s.lunch, &[cup]).is_err());

        assert!(create_recipe(&s.db, "Zero", "Serve", 0, &s.lunch, &[]).is_err());
        assert!(list_recipes(&s.db, None).unwrap().items.is_empty());
    }

    #[test]
    fn test_update_recipe_reconciles_measurements() {
        let s = setup();
        let created = create_recipe(
            &s.db,
            "Tuna Sandwich",
            "Stack it",
            2,
            &s.lunch,
            &[line(&s.bread, 100.0), line(&s.tuna, 100.0)],
        )
        .unwrap();
        let id = created.id.clone().unwrap();

        let mut bread = line(&s.bread, 150.0);
        bread.id = created.measurements[0].id.clone();
        let input = RecipeChangesInput {
            name: Some("Tuna Melt".to_string()),
            measurements: Some(vec![bread, line(&s.mayo, 10.0)]),
            ..Default::default()
        };
        let response = update_recipe(&s.db, &id, input).unwrap();
        assert_eq!(response.measurements_updated, 1);
        assert_eq!(response.measurements_deleted, 1);
        assert_eq!(response.measurements_inserted, 1);
        assert_eq!(response.recipe.name, "Tuna Melt");
        assert_eq!(response.recipe.instructions, "Stack it");
        assert_eq!(response.recipe.measurements[0].id, created.measurements[0].id);
        assert_eq!(response.recipe.measurements[0].grams, 150.0);
        assert_eq!(response.recipe.measurements[1].ingredient_name, "Mayonnaise");
    }

    #[test]
    fn test_update_without_measurements_keeps_them() {
        let s = setup();
        let created =
            create_recipe(&s.db, "Toast", "Toast it", 1, &s.lunch, &[line(&s.bread, 50.0)]).unwrap();
        let id = created.id.unwrap();
        let input = RecipeChangesInput { portion_amount: Some(3), ..Default::default() };
        let response = update_recipe(&s.db, &id, input).unwrap();
        assert_eq!(response.recipe.portion_amount, 3);
        assert_eq!(response.measurements_updated, 1);
        assert_eq!(response.measurements_deleted, 0);
        assert_eq!(response.recipe.measurements.len(), 1);
    }

    #[test]
    fn test_delete_recipe() {
        let s = setup();
        let id = create_recipe(&s.db, "Toast", "Toast it", 1, &s.lunch, &[line(&s.bread, 50.0)])
            .unwrap()
            .id
            .unwrap();
        assert!(delete_recipe(&s.db, &id).unwrap().success);
        assert!(get_recipe(&s.db, &id).unwrap().is_none());
        assert!(delete_recipe(&s.db, &id).is_err());
    }
}
