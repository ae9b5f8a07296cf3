//! Error types for history storage operations.

use thiserror::Error;

/// Result type alias using `CoreError`.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Storage error taxonomy.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(String),

    /// Entity not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Constraint violation.
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// Invalid input.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Schema migration failed.
    #[error("Migration error: {0}")]
    Migration(String),
}

impl From<sqlx::Error> for CoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Self::NotFound("requested entity not found".to_string()),
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                Self::ConstraintViolation(format!("unique constraint violation: {db_err}"))
            },
            sqlx::Error::Database(db_err) if db_err.is_check_violation() => {
                Self::ConstraintViolation(format!("check constraint violation: {db_err}"))
            },
            _ => Self::Database(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for CoreError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        Self::Migration(err.to_string())
    }
}
