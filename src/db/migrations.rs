//! Database migrations
//!
//! Schema creation and migration logic.

use rusqlite::Connection;

use super::connection::DbResult;

/// Current schema version
pub const SCHEMA_VERSION: i32 = 1;

/// Run all migrations to bring the database up to the current schema version
pub fn run_migrations(conn: &Connection) -> DbResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
        [],
    )?;

    let current_version = get_schema_version(conn)?;

    if current_version < 1 {
        migrate_v1(conn)?;
        conn.execute("INSERT INTO schema_migrations (version) VALUES (1)", [])?;
        tracing::info!("Applied schema migration v1");
    }

    Ok(())
}

/// Migration v1: Initial schema
fn migrate_v1(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(
        r#"
        -- ============================================
        -- CATEGORIES
        -- Classify either ingredients or recipes
        -- ============================================
        CREATE TABLE categories (
            id TEXT PRIMARY KEY,                 -- uuid
            name TEXT NOT NULL COLLATE NOCASE UNIQUE,
            kind TEXT NOT NULL CHECK(kind IN ('ingredient', 'recipe')),
            sort_order INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX idx_categories_kind ON categories(kind, sort_order);

        -- ============================================
        -- INGREDIENTS
        -- Nutrient values per 100 g
        -- ============================================
        CREATE TABLE ingredients (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL COLLATE NOCASE UNIQUE,
            fat REAL NOT NULL CHECK(fat > 0),
            carbohydrates REAL NOT NULL CHECK(carbohydrates > 0),
            protein REAL NOT NULL CHECK(protein > 0),
            calories REAL NOT NULL CHECK(calories > 0),
            category_id TEXT NOT NULL REFERENCES categories(id) ON DELETE RESTRICT,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX idx_ingredients_category ON ingredients(category_id);

        -- ============================================
        -- RECIPES
        -- ============================================
        CREATE TABLE recipes (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL COLLATE NOCASE UNIQUE,
            instructions TEXT NOT NULL,
            portion_amount INTEGER NOT NULL CHECK(portion_amount >= 1),
            category_id TEXT NOT NULL REFERENCES categories(id) ON DELETE RESTRICT,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX idx_recipes_category ON recipes(category_id);

        -- ============================================
        -- INGREDIENT MEASUREMENTS
        -- Owned by a recipe, one per ingredient
        -- ============================================
        CREATE TABLE ingredient_measurements (
            id TEXT PRIMARY KEY,
            recipe_id TEXT NOT NULL REFERENCES recipes(id) ON DELETE CASCADE,
            ingredient_id TEXT NOT NULL REFERENCES ingredients(id) ON DELETE RESTRICT,
            measurement REAL NOT NULL CHECK(measurement >= 0),
            unit TEXT NOT NULL,
            grams REAL NOT NULL CHECK(grams >= 0),
            note TEXT NOT NULL,
            sort_order INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now')),

            UNIQUE(recipe_id, ingredient_id)
        );

        CREATE INDEX idx_measurements_recipe ON ingredient_measurements(recipe_id, sort_order);
        CREATE INDEX idx_measurements_ingredient ON ingredient_measurements(ingredient_id);

        -- ============================================
        -- DAILY INTAKES
        -- ============================================
        CREATE TABLE daily_intakes (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL COLLATE NOCASE UNIQUE,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- entity_id points at an ingredient or a recipe, so it carries no foreign key
        CREATE TABLE daily_intake_entries (
            id TEXT PRIMARY KEY,
            daily_intake_id TEXT NOT NULL REFERENCES daily_intakes(id) ON DELETE CASCADE,
            entity_id TEXT NOT NULL,
            amount INTEGER NOT NULL CHECK(amount > 0),
            sort_order INTEGER NOT NULL,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),

            UNIQUE(daily_intake_id, sort_order)
        );

        CREATE INDEX idx_intake_entries_entity ON daily_intake_entries(entity_id);
        "#,
    )?;

    Ok(())
}

/// Get the current schema version
pub fn get_schema_version(conn: &Connection) -> DbResult<i32> {
    let version: i32 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
            [],
            |row| row.get(0),
        )
        .unwrap_or(0);
    Ok(version)
}

/// Check if the database needs migration
pub fn needs_migration(conn: &Connection) -> DbResult<bool> {
    let current = get_schema_version(conn)?;
    Ok(current < SCHEMA_VERSION)
}
