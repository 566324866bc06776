//! Repository Module
//!
//! CRUD operations over the SQLite tables, as free functions taking a
//! pool/connection. Row structs stay private here; parsing of JSON TEXT
//! columns happens exactly once at this boundary.

pub mod config;
pub mod price_history;
pub mod product;

use thiserror::Error;

/// Ceiling for "fetch everything" reads. The reconciliation engine needs
/// the complete per-user id set; real catalogs sit far below this bound.
pub const FETCH_ALL_LIMIT: i64 = 100_000;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Repository unavailable: {0}")]
    Unavailable(String),
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                RepoError::Unavailable(err.to_string())
            }
            _ => RepoError::Database(err.to_string()),
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;
