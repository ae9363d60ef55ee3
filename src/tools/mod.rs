//! Recept Tools module
//!
//! MCP tool implementations for ingredients, recipes and daily intakes.

pub mod categories;
pub mod daily_intakes;
pub mod ingredients;
pub mod recipes;
pub mod status;

use serde::Serialize;
use uuid::Uuid;

use crate::models::Identity;

/// Response for successful deletes
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub success: bool,
    pub deleted_id: String,
}

/// Parse an id passed in as a string parameter
pub(crate) fn parse_id(value: &str, what: &str) -> Result<Uuid, String> {
    Uuid::parse_str(value.trim()).map_err(|e| format!("Invalid {} id '{}': {}", what, value, e))
}

/// Render an identity for responses; unsaved entities have no id
pub(crate) fn id_string(identity: Identity) -> Option<String> {
    identity.uuid().map(|id| id.to_string())
}

#[cfg(test)]
pub(crate) fn test_database() -> crate::db::Database {
    let path = std::env::temp_dir().join(format!("recept-test-{}.db", Identity::generate()));
    let database = crate::db::Database::new(&path).unwrap();
    database
        .with_conn(crate::db::migrations::run_migrations)
        .unwrap();
    database
}
