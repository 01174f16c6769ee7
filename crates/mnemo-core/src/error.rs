//! Error types for mnemo-core.

use thiserror::Error;

/// Result type alias using the mnemo-core Error
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for memory store operations
#[derive(Error, Debug)]
pub enum Error {
    // Database errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Database lock poisoned")]
    LockPoisoned,

    // Validation errors
    #[error("Memory content must not be empty")]
    EmptyContent,

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Generic errors
    #[error("{0}")]
    Other(String),
}
