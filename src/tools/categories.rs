//! Category MCP Tools

use serde::Serialize;

use super::{id_string, parse_id, DeleteResponse};
use crate::db::{categories, Database};
use crate::models::{Category, CategoryKind};

/// Category as returned by the tools
#[derive(Debug, Serialize)]
pub struct CategorySummary {
    pub id: Option<String>,
    pub name: String,
    pub kind: CategoryKind,
    pub sort_order: i32,
}

impl From<&Category> for CategorySummary {
    fn from(category: &Category) -> Self {
        Self {
            id: id_string(category.id()),
            name: category.name().to_string(),
            kind: category.kind(),
            sort_order: category.sort_order(),
        }
    }
}

/// Response for list_categories
#[derive(Debug, Serialize)]
pub struct ListCategoriesResponse {
    pub categories: Vec<CategorySummary>,
    pub total: usize,
}

pub(crate) fn parse_kind(kind: &str) -> Result<CategoryKind, String> {
    CategoryKind::from_str(kind)
        .ok_or_else(|| format!("Unknown category kind '{}', expected 'ingredient' or 'recipe'", kind))
}

/// Create a new category
pub fn create_category(
    db: &Database,
    name: &str,
    kind: &str,
    sort_order: i32,
) -> Result<CategorySummary, String> {
    let kind = parse_kind(kind)?;
    let category = Category::new(name, kind, sort_order).map_err(|e| e.to_string())?;

    let saved = db
        .with_conn(|conn| categories::insert(conn, &category))
        .map_err(|e| format!("Failed to create category: {}", e))?;

    Ok(CategorySummary::from(&saved))
}

/// List categories, optionally of one kind
pub fn list_categories(db: &Database, kind: Option<&str>) -> Result<ListCategoriesResponse, String> {
    let kind = kind.map(parse_kind).transpose()?;

    let items = db
        .with_conn(|conn| categories::list(conn, kind))
        .map_err(|e| format!("Failed to list categories: {}", e))?;

    let categories: Vec<CategorySummary> = items.iter().map(CategorySummary::from).collect();
    let total = categories.len();
    Ok(ListCategoriesResponse { categories, total })
}

pub fn set_category_sort_order(db: &Database, id: &str, sort_order: i32) -> Result<CategorySummary, String> {
    let id = parse_id(id, "category")?;

    let updated = db
        .with_conn(|conn| categories::update_sort_order(conn, id, sort_order))
        .map_err(|e| format!("Failed to update category: {}", e))?;

    match updated {
        Some(category) => Ok(CategorySummary::from(&category)),
        None => Err(format!("Category not found with id: {}", id)),
    }
}

/// Delete a category that nothing uses
pub fn delete_category(db: &Database, id: &str) -> Result<DeleteResponse, String> {
    let id = parse_id(id, "category")?;

    let deleted = db
        .with_conn(|conn| categories::delete(conn, id))
        .map_err(|e| format!("Failed to delete category: {}", e))?;

    if !deleted {
        return Err(format!("Category not found with id: {}", id));
    }
    Ok(DeleteResponse {
        success: true,
        deleted_id: id.to_string(),
    })
}
