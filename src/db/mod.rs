//! Database module
//!
//! SQLite persistence for categories, ingredients, recipes and daily intakes.

pub mod categories;
pub mod connection;
pub mod daily_intakes;
pub mod ingredients;
pub mod migrations;
pub mod recipes;

pub use connection::{Database, DbError, DbResult};

/// In-memory connection with foreign keys on and the schema applied
#[cfg(test)]
pub(crate) fn test_connection() -> rusqlite::Connection {
    let conn = rusqlite::Connection::open_in_memory().unwrap();
    conn.execute_batch("PRAGMA foreign_keys = ON;").unwrap();
    migrations::run_migrations(&conn).unwrap();
    conn
}
