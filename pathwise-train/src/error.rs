//! Error types for pathwise-train

use thiserror::Error;

pub type TrainResult<T> = std::result::Result<T, TrainError>;

#[derive(Debug, Error)]
pub enum TrainError {
    /// A malformed cell or row in the input CSV; `line` is 1-based and
    /// counts the header.
    #[error("Dataset error at line {line}: {message}")]
    Dataset { line: usize, message: String },

    /// The dataset or training parameters are unusable as a whole.
    #[error("Invalid training input: {0}")]
    Invalid(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] pathwise_common::Error),
}
