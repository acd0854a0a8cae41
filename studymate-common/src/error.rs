//! Common error types for StudyMate

use thiserror::Error;

/// Common result type for StudyMate operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across StudyMate crates
#[derive(Error, Debug)]
pub enum Error {
    /// Precondition violation (negative minutes, zero level, bad stored state)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Chat history import/export error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),
}
