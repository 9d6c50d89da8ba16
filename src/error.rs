//! Error types for MODULIST.

use thiserror::Error;

/// Common error type for MODULIST.
#[derive(Error, Debug)]
pub enum ModulistError {
    /// Database error.
    ///
    /// Errors from sqlx are converted into this variant.
    #[error("database error: {0}")]
    Database(String),

    /// Database connection error.
    #[error("database connection error: {0}")]
    DatabaseConnection(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Validation error for user input.
    #[error("validation error: {0}")]
    Validation(String),

    /// Resource not found.
    #[error("{0} not found")]
    NotFound(String),

    /// Configuration error. Fatal at startup.
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<sqlx::Error> for ModulistError {
    fn from(e: sqlx::Error) -> Self {
        ModulistError::Database(e.to_string())
    }
}

/// Result type alias for MODULIST operations.
pub type Result<T> = std::result::Result<T, ModulistError>;
