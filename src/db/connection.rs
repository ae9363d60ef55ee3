//! Database connection management
//!
//! Provides SQLite connection pooling and the error type shared by all stores.

use std::path::Path;
use std::sync::Arc;

use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::OpenFlags;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{CategoryKind, Identity, ReconcileError, ResolveError, ValidationError};

/// Database error types
#[derive(Debug, Error)]
pub enum DbError {
    #[error("Database connection error: {0}")]
    Connection(#[from] r2d2::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Invalid id: {0}")]
    InvalidId(#[from] uuid::Error),

    #[error("Unknown {column} value '{value}'")]
    UnknownValue { column: &'static str, value: String },

    #[error("{entity} has not been saved")]
    Unpersisted { entity: &'static str },

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: Uuid },

    #[error("{entity} {id} is still referenced by {count} {referrer}")]
    InUse {
        entity: &'static str,
        id: Uuid,
        count: i64,
        referrer: &'static str,
    },

    #[error("Category '{name}' is a {actual} category, expected {expected}")]
    CategoryKindMismatch {
        name: String,
        expected: CategoryKind,
        actual: CategoryKind,
    },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Reconcile(#[from] ReconcileError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

/// Result type for database operations
pub type DbResult<T> = Result<T, DbError>;

/// Parse an id stored as TEXT
pub fn parse_id(s: &str) -> DbResult<Uuid> {
    Ok(Uuid::parse_str(s)?)
}

/// The stored id of an entity, or an error if it was never saved
pub fn require_id(identity: Identity, entity: &'static str) -> DbResult<Uuid> {
    identity.uuid().ok_or(DbError::Unpersisted { entity })
}

/// Database connection pool wrapper
#[derive(Clone)]
pub struct Database {
    pool: Arc<Pool<SqliteConnectionManager>>,
}

impl Database {
    /// Create a new database connection pool
    pub fn new<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let manager = SqliteConnectionManager::file(path)
            .with_flags(
                OpenFlags::SQLITE_OPEN_READ_WRITE
                    | OpenFlags::SQLITE_OPEN_CREATE
                    | OpenFlags::SQLITE_OPEN_URI,
            )
            .with_init(|conn| {
                conn.execute_batch(
                    "PRAGMA foreign_keys = ON;
                     PRAGMA journal_mode = WAL;
                     PRAGMA synchronous = NORMAL;
                     PRAGMA temp_store = MEMORY;",
                )?;
                Ok(())
            });

        let pool = Pool::builder()
            .max_size(8)
            .build(manager)?;

        Ok(Self {
            pool: Arc::new(pool),
        })
    }

    /// Get a connection from the pool
    pub fn get_conn(&self) -> DbResult<PooledConnection<SqliteConnectionManager>> {
        Ok(self.pool.get()?)
    }

    /// Execute a closure with a database connection
    pub fn with_conn<F, T>(&self, f: F) -> DbResult<T>
    where
        F: FnOnce(&rusqlite::Connection) -> DbResult<T>,
    {
        let conn = self.get_conn()?;
        f(&conn)
    }

    /// Execute a closure with a mutable database connection (for transactions)
    pub fn with_conn_mut<F, T>(&self, f: F) -> DbResult<T>
    where
        F: FnOnce(&mut rusqlite::Connection) -> DbResult<T>,
    {
        let mut conn = self.get_conn()?;
        f(&mut conn)
    }
}
