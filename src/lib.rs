//! Recept Library
//!
//! Ingredients, recipes and daily intake logs with nutrition totals,
//! persisted in SQLite and served over MCP.

pub mod build_info;
pub mod db;
pub mod mcp;
pub mod models;
pub mod tools;
