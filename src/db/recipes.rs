//! Recipe store
//!
//! Recipes are saved together with their ingredient measurements. Updates go
//! through [`reconcile`] so that only changed measurement rows are touched.

use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

use super::connection::{parse_id, require_id, DbError, DbResult};
use super::{categories, ingredients};
use crate::models::{
    reconcile, CategoryKind, Identity, IngredientMeasurement, MeasurementUnit, Recipe, RecipeChanges,
};

struct RecipeRow {
    id: String,
    name: String,
    instructions: String,
    portion_amount: i32,
    category_id: String,
}

impl RecipeRow {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            instructions: row.get("instructions")?,
            portion_amount: row.get("portion_amount")?,
            category_id: row.get("category_id")?,
        })
    }
}

struct MeasurementRow {
    id: String,
    ingredient_id: String,
    measurement: f64,
    unit: String,
    grams: f64,
    note: String,
    sort_order: i32,
}

impl MeasurementRow {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            ingredient_id: row.get("ingredient_id")?,
            measurement: row.get("measurement")?,
            unit: row.get("unit")?,
            grams: row.get("grams")?,
            note: row.get("note")?,
            sort_order: row.get("sort_order")?,
        })
    }

    fn load(self, conn: &Connection) -> DbResult<IngredientMeasurement> {
        let unit = MeasurementUnit::from_str(&self.unit).ok_or(DbError::UnknownValue {
            column: "ingredient_measurements.unit",
            value: self.unit.clone(),
        })?;
        let ingredient_id = parse_id(&self.ingredient_id)?;
        let ingredient = ingredients::get_by_id(conn, ingredient_id)?.ok_or(DbError::NotFound {
            entity: "Ingredient",
            id: ingredient_id,
        })?;
        Ok(IngredientMeasurement::restore(
            parse_id(&self.id)?,
            self.measurement,
            unit,
            self.grams,
            self.note,
            self.sort_order,
            ingredient,
        ))
    }
}

fn load_measurements(conn: &Connection, recipe_id: Uuid) -> DbResult<Vec<IngredientMeasurement>> {
    let mut stmt = conn.prepare(
        "SELECT * FROM ingredient_measurements WHERE recipe_id = ?1 ORDER BY sort_order ASC, rowid ASC",
    )?;
    let rows = stmt
        .query_map([recipe_id.to_string()], MeasurementRow::from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    rows.into_iter().map(|row| row.load(conn)).collect()
}

fn insert_measurement(
    conn: &Connection,
    recipe_id: Uuid,
    measurement: &IngredientMeasurement,
) -> DbResult<Uuid> {
    let ingredient_id = require_id(measurement.ingredient_id(), "Ingredient")?;
    if ingredients::get_by_id(conn, ingredient_id)?.is_none() {
        return Err(DbError::NotFound { entity: "Ingredient", id: ingredient_id });
    }

    let id = Identity::generate();
    conn.execute(
        r#"
        INSERT INTO ingredient_measurements (
            id, recipe_id, ingredient_id, measurement, unit, grams, note, sort_order
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        "#,
        params![
            id.to_string(),
            recipe_id.to_string(),
            ingredient_id.to_string(),
            measurement.measurement(),
            measurement.unit().as_str(),
            measurement.grams(),
            measurement.note(),
            measurement.sort_order(),
        ],
    )?;
    Ok(id)
}

/// Rewrite updated measurement rows under their existing ids.
///
/// All rows are removed before any is written back, so measurements may trade
/// ingredients without tripping `UNIQUE(recipe_id, ingredient_id)` halfway.
fn rewrite_measurements(
    conn: &Connection,
    recipe_id: Uuid,
    measurements: &[IngredientMeasurement],
) -> DbResult<()> {
    let mut created = Vec::with_capacity(measurements.len());
    for measurement in measurements {
        let id = require_id(measurement.id(), "Ingredient measurement")?;
        let created_at: Option<String> = conn
            .query_row(
                "SELECT created_at FROM ingredient_measurements WHERE id = ?1 AND recipe_id = ?2",
                params![id.to_string(), recipe_id.to_string()],
                |row| row.get(0),
            )
            .optional()?;
        let created_at = created_at.ok_or(DbError::NotFound {
            entity: "Ingredient measurement",
            id,
        })?;
        conn.execute("DELETE FROM ingredient_measurements WHERE id = ?1", [id.to_string()])?;
        created.push((id, created_at));
    }

    for (measurement, (id, created_at)) in measurements.iter().zip(created) {
        let ingredient_id = require_id(measurement.ingredient_id(), "Ingredient")?;
        conn.execute(
            r#"
            INSERT INTO ingredient_measurements (
                id, recipe_id, ingredient_id, measurement, unit, grams, note, sort_order,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, datetime('now'))
            "#,
            params![
                id.to_string(),
                recipe_id.to_string(),
                ingredient_id.to_string(),
                measurement.measurement(),
                measurement.unit().as_str(),
                measurement.grams(),
                measurement.note(),
                measurement.sort_order(),
                created_at,
            ],
        )?;
    }
    Ok(())
}

/// Insert a recipe with all of its measurements in one transaction
pub fn insert(conn: &mut Connection, recipe: &Recipe) -> DbResult<Recipe> {
    let category_id = require_id(recipe.category_id(), "Category")?;
    let id = recipe.id().uuid().unwrap_or_else(Identity::generate);

    let tx = conn.transaction()?;
    categories::require(&tx, category_id, CategoryKind::Recipe)?;
    tx.execute(
        r#"
        INSERT INTO recipes (id, name, instructions, portion_amount, category_id)
        VALUES (?1, ?2, ?3, ?4, ?5)
        "#,
        params![
            id.to_string(),
            recipe.name(),
            recipe.instructions(),
            recipe.portion_amount(),
            category_id.to_string(),
        ],
    )?;
    for measurement in recipe.measurements() {
        insert_measurement(&tx, id, measurement)?;
    }
    tx.commit()?;

    get_by_id(conn, id)?.ok_or(DbError::NotFound { entity: "Recipe", id })
}

/// Load a recipe with its category and measurements in sort order
pub fn get_by_id(conn: &Connection, id: Uuid) -> DbResult<Option<Recipe>> {
    let row = conn
        .query_row(
            "SELECT * FROM recipes WHERE id = ?1",
            [id.to_string()],
            RecipeRow::from_row,
        )
        .optional()?;
    let Some(row) = row else {
        return Ok(None);
    };

    let category_id = parse_id(&row.category_id)?;
    let category = categories::get_by_id(conn, category_id)?.ok_or(DbError::NotFound {
        entity: "Category",
        id: category_id,
    })?;
    let measurements = load_measurements(conn, id)?;

    Ok(Some(Recipe::restore(
        parse_id(&row.id)?,
        row.name,
        row.instructions,
        row.portion_amount,
        category,
        measurements,
    )))
}

/// Case-insensitive lookup by name
pub fn get_by_name(conn: &Connection, name: &str) -> DbResult<Option<Recipe>> {
    let id: Option<String> = conn
        .query_row("SELECT id FROM recipes WHERE name = ?1", [name.trim()], |row| row.get(0))
        .optional()?;
    match id {
        Some(id) => get_by_id(conn, parse_id(&id)?),
        None => Ok(None),
    }
}

/// List recipes by name, optionally within one category
pub fn list(conn: &Connection, category_id: Option<Uuid>) -> DbResult<Vec<Recipe>> {
    let ids = match category_id {
        Some(category_id) => {
            let mut stmt =
                conn.prepare("SELECT id FROM recipes WHERE category_id = ?1 ORDER BY name ASC")?;
            let ids = stmt
                .query_map([category_id.to_string()], |row| row.get::<_, String>(0))?
                .collect::<Result<Vec<_>, _>>()?;
            ids
        }
        None => {
            let mut stmt = conn.prepare("SELECT id FROM recipes ORDER BY name ASC")?;
            let ids = stmt
                .query_map([], |row| row.get::<_, String>(0))?
                .collect::<Result<Vec<_>, _>>()?;
            ids
        }
    };

    let mut recipes = Vec::with_capacity(ids.len());
    for id in ids {
        let id = parse_id(&id)?;
        if let Some(recipe) = get_by_id(conn, id)? {
            recipes.push(recipe);
        }
    }
    Ok(recipes)
}

/// Bring the stored recipe in line with `desired`.
///
/// Loads the current recipe, reconciles it against `desired` and writes the
/// resulting change sets in one transaction. Returns the reloaded recipe and
/// the applied changes (inserted measurements carry their new ids), or
/// Ok(None) if the recipe does not exist.
pub fn update(conn: &mut Connection, desired: &Recipe) -> DbResult<Option<(Recipe, RecipeChanges)>> {
    let id = require_id(desired.id(), "Recipe")?;
    let Some(mut current) = get_by_id(conn, id)? else {
        return Ok(None);
    };

    let category_id = require_id(desired.category_id(), "Category")?;
    categories::require(conn, category_id, CategoryKind::Recipe)?;

    let wanted: Vec<Uuid> = desired
        .measurements()
        .iter()
        .filter(|m| !m.id().is_persisted())
        .filter_map(|m| m.ingredient_id().uuid())
        .collect();
    let lookup = ingredients::get_many(conn, &wanted)?;

    let mut changes = reconcile(&mut current, desired, &lookup)?;

    let tx = conn.transaction()?;
    tx.execute(
        r#"
        UPDATE recipes
        SET name = ?1, instructions = ?2, portion_amount = ?3, category_id = ?4,
            updated_at = datetime('now')
        WHERE id = ?5
        "#,
        params![
            current.name(),
            current.instructions(),
            current.portion_amount(),
            require_id(current.category_id(), "Category")?.to_string(),
            id.to_string(),
        ],
    )?;
    for measurement in &changes.deleted {
        let measurement_id = require_id(measurement.id(), "Ingredient measurement")?;
        tx.execute(
            "DELETE FROM ingredient_measurements WHERE id = ?1",
            [measurement_id.to_string()],
        )?;
    }
    rewrite_measurements(&tx, id, &changes.updated)?;
    for measurement in changes.inserted.iter_mut() {
        let measurement_id = insert_measurement(&tx, id, measurement)?;
        measurement.assign_id(measurement_id);
    }
    tx.commit()?;

    tracing::info!(
        "Updated recipe '{}': {} measurements updated, {} deleted, {} inserted",
        current.name(),
        changes.updated.len(),
        changes.deleted.len(),
        changes.inserted.len()
    );

    let reloaded = get_by_id(conn, id)?.ok_or(DbError::NotFound { entity: "Recipe", id })?;
    Ok(Some((reloaded, changes)))
}

/// Delete a recipe and its measurements unless a daily intake still logs it.
/// Returns Ok(false) if it does not exist.
pub fn delete(conn: &Connection, id: Uuid) -> DbResult<bool> {
    let key = id.to_string();
    let exists: Option<String> = conn
        .query_row("SELECT id FROM recipes WHERE id = ?1", [&key], |row| row.get(0))
        .optional()?;
    if exists.is_none() {
        return Ok(false);
    }

    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM daily_intake_entries WHERE entity_id = ?1",
        [&key],
        |row| row.get(0),
    )?;
    if count > 0 {
        return Err(DbError::InUse {
            entity: "Recipe",
            id,
            count,
            referrer: "daily intake entries",
        });
    }

    let rows = conn.execute("DELETE FROM recipes WHERE id = ?1", [&key])?;
    Ok(rows > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_connection;
    use crate::models::{Category, Ingredient, ReconcileError};

    struct Kitchen {
        conn: Connection,
        lunch: Category,
        bread: Ingredient,
        tuna: Ingredient,
        mayo: Ingredient,
    }

    fn kitchen() -> Kitchen {
        let conn = test_connection();
        let pantry =
            categories::insert(&conn, &Category::new("Pantry", CategoryKind::Ingredient, 0).unwrap()).unwrap();
        let lunch =
            categories::insert(&conn, &Category::new("Lunch", CategoryKind::Recipe, 0).unwrap()).unwrap();
        let add = |name: &str, fat: f64, calories: f64| {
            ingredients::insert(&conn, &Ingredient::new(name, fat, 10.0, 10.0, calories, pantry.clone()).unwrap())
                .unwrap()
        };
        let bread = add("Bread", 3.0, 260.0);
        let tuna = add("Tuna", 1.0, 120.0);
        let mayo = add("Mayonnaise", 75.0, 680.0);
        Kitchen { conn, lunch, bread, tuna, mayo }
    }

    fn measure(ingredient: &Ingredient, grams: f64, sort_order: i32) -> IngredientMeasurement {
        IngredientMeasurement::new(grams, MeasurementUnit::Gram, grams, "As needed", sort_order, ingredient.clone())
            .unwrap()
    }

    fn sandwich(k: &mut Kitchen) -> Recipe {
        let mut recipe = Recipe::new("Tuna Sandwich", "Spread and stack", 2, k.lunch.clone()).unwrap();
        recipe.add_measurement(measure(&k.bread, 80.0, 0));
        recipe.add_measurement(measure(&k.tuna, 100.0, 1));
        insert(&mut k.conn, &recipe).unwrap()
    }

    fn measurement_count(conn: &Connection) -> i64 {
        conn.query_row("SELECT COUNT(*) FROM ingredient_measurements", [], |row| row.get(0))
            .unwrap()
    }

    #[test]
    fn test_insert_and_load_graph() {
        let mut k = kitchen();
        let saved = sandwich(&mut k);
        assert!(saved.id().is_persisted());
        assert_eq!(saved.category(), &k.lunch);
        assert_eq!(saved.measurements().len(), 2);
        assert!(saved.measurements().iter().all(|m| m.id().is_persisted()));
        assert_eq!(saved.measurements()[0].ingredient(), &k.bread);
        assert_eq!(saved.measurements()[1].ingredient().category().name(), "Pantry");
        assert!((saved.calorie_amount() - (260.0 * 0.8 + 120.0)).abs() < 1e-9);

        let by_name = get_by_name(&k.conn, "tuna sandwich").unwrap().unwrap();
        assert_eq!(by_name, saved);
    }

    #[test]
    fn test_insert_rejects_ingredient_category() {
        let mut k = kitchen();
        let mut recipe = Recipe::new("Soup", "Boil", 1, k.lunch.clone()).unwrap();
        recipe.set_category(Some(k.tuna.category().clone()));
        assert!(matches!(
            insert(&mut k.conn, &recipe),
            Err(DbError::CategoryKindMismatch { .. })
        ));
    }

    #[test]
    fn test_insert_rolls_back_on_missing_ingredient() {
        let mut k = kitchen();
        let ghost = Ingredient::new("Ghost", 1.0, 1.0, 1.0, 1.0, k.tuna.category().clone())
            .unwrap()
            .with_id(Identity::generate());
        let mut recipe = Recipe::new("Haunted", "Boo", 1, k.lunch.clone()).unwrap();
        recipe.add_measurement(measure(&k.bread, 10.0, 0));
        recipe.add_measurement(measure(&ghost, 10.0, 1));

        assert!(matches!(insert(&mut k.conn, &recipe), Err(DbError::NotFound { .. })));
        assert!(get_by_name(&k.conn, "Haunted").unwrap().is_none());
        assert_eq!(measurement_count(&k.conn), 0);
    }

    #[test]
    fn test_update_applies_change_sets() {
        let mut k = kitchen();
        let saved = sandwich(&mut k);
        let bread_row = saved.measurements()[0].clone();
        let tuna_row = saved.measurements()[1].clone();

        let mut desired = Recipe::new("Tuna Melt", "Grill it", 1, k.lunch.clone())
            .unwrap()
            .with_id(saved.id().uuid().unwrap());
        let mut thicker = bread_row.clone();
        thicker.set_grams(120.0);
        desired.add_measurement(thicker);
        desired.add_measurement(measure(&k.mayo, 15.0, 1));

        let (updated, changes) = update(&mut k.conn, &desired).unwrap().unwrap();

        assert_eq!(changes.updated.len(), 1);
        assert_eq!(changes.deleted.len(), 1);
        assert_eq!(changes.deleted[0].id(), tuna_row.id());
        assert_eq!(changes.inserted.len(), 1);
        assert!(changes.inserted[0].id().is_persisted());

        assert_eq!(updated.name(), "Tuna Melt");
        assert_eq!(updated.instructions(), "Grill it");
        assert_eq!(updated.portion_amount(), 1);
        let rows: Vec<(Identity, String, f64)> = updated
            .measurements()
            .iter()
            .map(|m| (m.id(), m.ingredient().name().to_string(), m.grams()))
            .collect();
        assert_eq!(
            rows,
            vec![
                (bread_row.id(), "Bread".to_string(), 120.0),
                (changes.inserted[0].id(), "Mayonnaise".to_string(), 15.0),
            ]
        );
        assert_eq!(measurement_count(&k.conn), 2);
    }

    #[test]
    fn test_update_lookup_failure_changes_nothing() {
        let mut k = kitchen();
        let saved = sandwich(&mut k);
        let ghost = Ingredient::new("Ghost", 1.0, 1.0, 1.0, 1.0, k.tuna.category().clone())
            .unwrap()
            .with_id(Identity::generate());
        let mut desired = Recipe::new("Renamed", "Changed", 3, k.lunch.clone())
            .unwrap()
            .with_id(saved.id().uuid().unwrap());
        desired.add_measurement(measure(&ghost, 5.0, 0));

        let err = update(&mut k.conn, &desired).unwrap_err();
        assert!(matches!(err, DbError::Reconcile(ReconcileError::IngredientNotFound(_))));
        let reloaded = get_by_id(&k.conn, saved.id().uuid().unwrap()).unwrap().unwrap();
        assert_eq!(reloaded, saved);
    }

    #[test]
    fn test_update_swaps_ingredients_between_rows() {
        let mut k = kitchen();
        let saved = sandwich(&mut k);
        let first = saved.measurements()[0].clone();
        let second = saved.measurements()[1].clone();

        let mut desired = Recipe::new("Tuna Sandwich", "Spread and stack", 2, k.lunch.clone())
            .unwrap()
            .with_id(saved.id().uuid().unwrap());
        let mut first_to_tuna = first.clone();
        first_to_tuna.set_ingredient(k.tuna.clone());
        let mut second_to_bread = second.clone();
        second_to_bread.set_ingredient(k.bread.clone());
        desired.add_measurement(first_to_tuna);
        desired.add_measurement(second_to_bread);

        let (updated, changes) = update(&mut k.conn, &desired).unwrap().unwrap();
        assert_eq!(changes.updated.len(), 2);
        assert!(changes.deleted.is_empty());
        assert!(changes.inserted.is_empty());

        let rows: Vec<(Identity, String)> = updated
            .measurements()
            .iter()
            .map(|m| (m.id(), m.ingredient().name().to_string()))
            .collect();
        assert_eq!(
            rows,
            vec![
                (first.id(), "Tuna".to_string()),
                (second.id(), "Bread".to_string()),
            ]
        );
        assert_eq!(measurement_count(&k.conn), 2);
    }

    #[test]
    fn test_update_missing_recipe() {
        let mut k = kitchen();
        let desired = Recipe::new("Nowhere", "Nothing", 1, k.lunch.clone())
            .unwrap()
            .with_id(Identity::generate());
        assert!(update(&mut k.conn, &desired).unwrap().is_none());
    }

    #[test]
    fn test_list_and_delete_cascades() {
        let mut k = kitchen();
        let saved = sandwich(&mut k);
        let id = saved.id().uuid().unwrap();
        assert_eq!(list(&k.conn, None).unwrap().len(), 1);
        assert_eq!(list(&k.conn, k.lunch.id().uuid()).unwrap().len(), 1);
        assert!(list(&k.conn, Some(Identity::generate())).unwrap().is_empty());

        assert!(delete(&k.conn, id).unwrap());
        assert_eq!(measurement_count(&k.conn), 0);
        assert!(!delete(&k.conn, id).unwrap());
    }

    #[test]
    fn test_ingredient_in_recipe_cannot_be_deleted() {
        let mut k = kitchen();
        sandwich(&mut k);
        let err = ingredients::delete(&k.conn, k.tuna.id().uuid().unwrap()).unwrap_err();
        assert!(matches!(err, DbError::InUse { count: 1, .. }));
    }
}
