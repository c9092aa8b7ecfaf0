//! SQLite persistence: connection setup, schema migrations, repositories.

pub mod repository;
pub mod sqlite;

pub use repository::*;
pub use sqlite::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("SQLite error: {0}")]
    Sqlite(rusqlite::Error),

    #[error("Cannot prepare database location {path}: {source}")]
    Location {
        path: String,
        source: std::io::Error,
    },

    #[error("Invalid enum value for {field}: {value}")]
    InvalidEnum { field: String, value: String },

    #[error("Migration {version} failed: {reason}")]
    MigrationFailed { version: u32, reason: String },

    /// UNIQUE / CHECK / FOREIGN KEY failures, surfaced separately so
    /// callers can turn duplicates into user-facing conflicts.
    #[error("Constraint violated: {0}")]
    ConstraintViolation(String),
}

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        if let rusqlite::Error::SqliteFailure(e, msg) = &err {
            if e.code == rusqlite::ErrorCode::ConstraintViolation {
                let detail = msg.clone().unwrap_or_else(|| e.to_string());
                return DatabaseError::ConstraintViolation(detail);
            }
        }
        DatabaseError::Sqlite(err)
    }
}
