//! Ingredient store

use std::collections::HashMap;

use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

use super::categories;
use super::connection::{parse_id, require_id, DbError, DbResult};
use crate::models::{Category, CategoryKind, Identity, Ingredient, Nutrition};

struct IngredientRow {
    id: String,
    name: String,
    nutrition: Nutrition,
    category_id: String,
}

impl IngredientRow {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            nutrition: Nutrition {
                fat: row.get("fat")?,
                carbohydrates: row.get("carbohydrates")?,
                protein: row.get("protein")?,
                calories: row.get("calories")?,
            },
            category_id: row.get("category_id")?,
        })
    }

    fn into_ingredient(self, category: Category) -> DbResult<Ingredient> {
        Ok(Ingredient::restore(parse_id(&self.id)?, self.name, self.nutrition, category))
    }

    fn load(self, conn: &Connection) -> DbResult<Ingredient> {
        let category_id = parse_id(&self.category_id)?;
        let category = categories::get_by_id(conn, category_id)?.ok_or(DbError::NotFound {
            entity: "Category",
            id: category_id,
        })?;
        self.into_ingredient(category)
    }
}

/// Insert an ingredient. Its category must be saved and of kind Ingredient.
pub fn insert(conn: &Connection, ingredient: &Ingredient) -> DbResult<Ingredient> {
    let category_id = require_id(ingredient.category_id(), "Category")?;
    let category = categories::require(conn, category_id, CategoryKind::Ingredient)?;

    let id = ingredient.id().uuid().unwrap_or_else(Identity::generate);
    conn.execute(
        r#"
        INSERT INTO ingredients (id, name, fat, carbohydrates, protein, calories, category_id)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        "#,
        params![
            id.to_string(),
            ingredient.name(),
            ingredient.fat(),
            ingredient.carbohydrates(),
            ingredient.protein(),
            ingredient.calories(),
            category_id.to_string(),
        ],
    )?;

    Ok(Ingredient::restore(id, ingredient.name().to_string(), ingredient.nutrition(), category))
}

pub fn get_by_id(conn: &Connection, id: Uuid) -> DbResult<Option<Ingredient>> {
    let row = conn
        .query_row(
            "SELECT * FROM ingredients WHERE id = ?1",
            [id.to_string()],
            IngredientRow::from_row,
        )
        .optional()?;
    row.map(|r| r.load(conn)).transpose()
}

/// Case-insensitive lookup by name
pub fn get_by_name(conn: &Connection, name: &str) -> DbResult<Option<Ingredient>> {
    let row = conn
        .query_row(
            "SELECT * FROM ingredients WHERE name = ?1",
            [name.trim()],
            IngredientRow::from_row,
        )
        .optional()?;
    row.map(|r| r.load(conn)).transpose()
}

/// Load the ingredients with the given ids; missing ids are simply absent
pub fn get_many(conn: &Connection, ids: &[Uuid]) -> DbResult<HashMap<Uuid, Ingredient>> {
    let mut found = HashMap::with_capacity(ids.len());
    for id in ids {
        if found.contains_key(id) {
            continue;
        }
        if let Some(ingredient) = get_by_id(conn, *id)? {
            found.insert(*id, ingredient);
        }
    }
    Ok(found)
}

/// List ingredients by name, optionally within one category
pub fn list(conn: &Connection, category_id: Option<Uuid>) -> DbResult<Vec<Ingredient>> {
    let rows = match category_id {
        Some(category_id) => {
            let mut stmt =
                conn.prepare("SELECT * FROM ingredients WHERE category_id = ?1 ORDER BY name ASC")?;
            let rows = stmt
                .query_map([category_id.to_string()], IngredientRow::from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            rows
        }
        None => {
            let mut stmt = conn.prepare("SELECT * FROM ingredients ORDER BY name ASC")?;
            let rows = stmt
                .query_map([], IngredientRow::from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            rows
        }
    };

    let mut category_cache: HashMap<String, Category> = HashMap::new();
    let mut ingredients = Vec::with_capacity(rows.len());
    for row in rows {
        let category = match category_cache.get(&row.category_id) {
            Some(category) => category.clone(),
            None => {
                let category_id = parse_id(&row.category_id)?;
                let category = categories::get_by_id(conn, category_id)?.ok_or(DbError::NotFound {
                    entity: "Category",
                    id: category_id,
                })?;
                category_cache.insert(row.category_id.clone(), category.clone());
                category
            }
        };
        ingredients.push(row.into_ingredient(category)?);
    }
    Ok(ingredients)
}

/// Write back every field of a saved ingredient. Returns Ok(None) if it no longer exists.
pub fn update(conn: &Connection, ingredient: &Ingredient) -> DbResult<Option<Ingredient>> {
    let id = require_id(ingredient.id(), "Ingredient")?;
    let category_id = require_id(ingredient.category_id(), "Category")?;
    categories::require(conn, category_id, CategoryKind::Ingredient)?;

    let rows = conn.execute(
        r#"
        UPDATE ingredients
        SET name = ?1, fat = ?2, carbohydrates = ?3, protein = ?4, calories = ?5,
            category_id = ?6, updated_at = datetime('now')
        WHERE id = ?7
        "#,
        params![
            ingredient.name(),
            ingredient.fat(),
            ingredient.carbohydrates(),
            ingredient.protein(),
            ingredient.calories(),
            category_id.to_string(),
            id.to_string(),
        ],
    )?;
    if rows == 0 {
        return Ok(None);
    }

    get_by_id(conn, id)
}

/// Number of recipe measurements and intake entries referencing an ingredient
pub fn get_usage_count(conn: &Connection, id: Uuid) -> DbResult<i64> {
    let count: i64 = conn.query_row(
        "SELECT (SELECT COUNT(*) FROM ingredient_measurements WHERE ingredient_id = ?1)
              + (SELECT COUNT(*) FROM daily_intake_entries WHERE entity_id = ?1)",
        [id.to_string()],
        |row| row.get(0),
    )?;
    Ok(count)
}

/// Delete an unused ingredient. Returns Ok(false) if it does not exist.
pub fn delete(conn: &Connection, id: Uuid) -> DbResult<bool> {
    if get_by_id(conn, id)?.is_none() {
        return Ok(false);
    }

    let count = get_usage_count(conn, id)?;
    if count > 0 {
        return Err(DbError::InUse {
            entity: "Ingredient",
            id,
            count,
            referrer: "recipes or daily intake entries",
        });
    }

    let rows = conn.execute("DELETE FROM ingredients WHERE id = ?1", [id.to_string()])?;
    Ok(rows > 0)
}
