//! Common error types for the dataset pipeline

use thiserror::Error;

/// Common result type for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across pipeline stages
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV read/write error (wraps csv::Error)
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON read/write error (wraps serde_json::Error)
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Input table does not match the expected column layout.
    ///
    /// Fatal: raised before any transform runs and never recovered.
    #[error("Schema error: {0}")]
    Schema(String),

    /// Invalid value passed to a pipeline operation
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
