//! Category store

use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

use super::connection::{parse_id, DbError, DbResult};
use crate::models::{Category, CategoryKind, Identity};

struct CategoryRow {
    id: String,
    name: String,
    kind: String,
    sort_order: i32,
}

impl CategoryRow {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            kind: row.get("kind")?,
            sort_order: row.get("sort_order")?,
        })
    }

    fn into_category(self) -> DbResult<Category> {
        let kind = CategoryKind::from_str(&self.kind).ok_or(DbError::UnknownValue {
            column: "categories.kind",
            value: self.kind.clone(),
        })?;
        let id = parse_id(&self.id)?;
        Ok(Category::new(&self.name, kind, self.sort_order)?.with_id(id))
    }
}

/// Insert a category, minting an id unless it already carries one
pub fn insert(conn: &Connection, category: &Category) -> DbResult<Category> {
    let id = category.id().uuid().unwrap_or_else(Identity::generate);
    conn.execute(
        "INSERT INTO categories (id, name, kind, sort_order) VALUES (?1, ?2, ?3, ?4)",
        params![
            id.to_string(),
            category.name(),
            category.kind().as_str(),
            category.sort_order(),
        ],
    )?;
    Ok(category.clone().with_id(id))
}

pub fn get_by_id(conn: &Connection, id: Uuid) -> DbResult<Option<Category>> {
    let row = conn
        .query_row(
            "SELECT * FROM categories WHERE id = ?1",
            [id.to_string()],
            CategoryRow::from_row,
        )
        .optional()?;
    row.map(CategoryRow::into_category).transpose()
}

/// Case-insensitive lookup by name
pub fn get_by_name(conn: &Connection, name: &str) -> DbResult<Option<Category>> {
    let row = conn
        .query_row(
            "SELECT * FROM categories WHERE name = ?1",
            [name.trim()],
            CategoryRow::from_row,
        )
        .optional()?;
    row.map(CategoryRow::into_category).transpose()
}

/// Load a category and check that it classifies `expected` entities
pub fn require(conn: &Connection, id: Uuid, expected: CategoryKind) -> DbResult<Category> {
    let category = get_by_id(conn, id)?.ok_or(DbError::NotFound { entity: "Category", id })?;
    if category.kind() != expected {
        return Err(DbError::CategoryKindMismatch {
            name: category.name().to_string(),
            expected,
            actual: category.kind(),
        });
    }
    Ok(category)
}

/// List categories in sort order, optionally of a single kind
pub fn list(conn: &Connection, kind: Option<CategoryKind>) -> DbResult<Vec<Category>> {
    let rows = match kind {
        Some(kind) => {
            let mut stmt = conn.prepare(
                "SELECT * FROM categories WHERE kind = ?1 ORDER BY sort_order ASC, name ASC",
            )?;
            let rows = stmt
                .query_map([kind.as_str()], CategoryRow::from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            rows
        }
        None => {
            let mut stmt =
                conn.prepare("SELECT * FROM categories ORDER BY kind ASC, sort_order ASC, name ASC")?;
            let rows = stmt
                .query_map([], CategoryRow::from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            rows
        }
    };

    rows.into_iter().map(CategoryRow::into_category).collect()
}

pub fn update_sort_order(conn: &Connection, id: Uuid, sort_order: i32) -> DbResult<Option<Category>> {
    let Some(mut category) = get_by_id(conn, id)? else {
        return Ok(None);
    };
    category.set_sort_order(sort_order);
    conn.execute(
        "UPDATE categories SET sort_order = ?1, updated_at = datetime('now') WHERE id = ?2",
        params![category.sort_order(), id.to_string()],
    )?;
    Ok(Some(category))
}

/// Delete a category that no ingredient or recipe uses.
/// Returns Ok(false) if it does not exist.
pub fn delete(conn: &Connection, id: Uuid) -> DbResult<bool> {
    if get_by_id(conn, id)?.is_none() {
        return Ok(false);
    }

    let key = id.to_string();
    let count: i64 = conn.query_row(
        "SELECT (SELECT COUNT(*) FROM ingredients WHERE category_id = ?1)
              + (SELECT COUNT(*) FROM recipes WHERE category_id = ?1)",
        [&key],
        |row| row.get(0),
    )?;
    if count > 0 {
        return Err(DbError::InUse {
            entity: "Category",
            id,
            count,
            referrer: "ingredients or recipes",
        });
    }

    let rows = conn.execute("DELETE FROM categories WHERE id = ?1", [&key])?;
    Ok(rows > 0)
}
