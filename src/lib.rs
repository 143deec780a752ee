//! # Garagebook - service catalogue store for auto-repair shops
//!
//! Garagebook keeps a workshop's catalogue of services and service
//! categories in an embedded SQLite database.
//!
//! Garagebook provides:
//! - Schema initialization with foreign-key enforcement and idempotent seeding
//! - Typed CRUD over services and categories with soft delete
//! - A referential guard that refuses to retire categories still in use
//! - A CLI and a JSON HTTP API over the same store

pub mod model;
pub mod storage;
pub mod config;
pub mod output;
pub mod server;
pub mod ui;

// Re-exports for convenient access
pub use model::{
    CategoryFields, CategorySummary, EntityStatus, Service, ServiceCategory, ServiceFields,
};
pub use storage::ShopStore;

use std::path::PathBuf;

/// Result type alias for Garagebook operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for Garagebook operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Category {id} is still used by {active_services} active service(s)")]
    CategoryInUse { id: i64, active_services: usize },

    #[error("Category {id} is inactive; reactivate it before attaching services")]
    CategoryInactive { id: i64 },

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Failed to load schema from {}: {source}", path.display())]
    SchemaLoad {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid status flag in database: {0}")]
    InvalidStatus(i64),

    #[error("Invalid stored value: {0}")]
    InvalidValue(String),
}

impl Error {
    /// Splits SQLite constraint failures out of generic storage errors so
    /// callers can tell a rejected write from an engine failure.
    pub(crate) fn from_write(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(code, msg)
                if code.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Error::ConstraintViolation(msg.unwrap_or_else(|| code.to_string()))
            }
            other => Error::Storage(other),
        }
    }
}
