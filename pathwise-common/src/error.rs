//! Common error types for Pathwise

use thiserror::Error;

/// Common result type for Pathwise operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types shared by the trainer and the inference service
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Trained artifact missing, unparsable, or internally inconsistent
    #[error("Artifact error: {0}")]
    Artifact(String),

    /// Label outside an encoder's trained vocabulary
    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}
