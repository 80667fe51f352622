//! Error types for the sift library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for sift operations.
#[derive(Debug, Error)]
pub enum SiftError {
    /// Error reading or writing a file. Raised for an unavailable source.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error from the CSV library.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The source header does not carry the expected columns.
    #[error("Schema error: {0}")]
    Schema(String),

    /// Invalid delimiter detected or specified.
    #[error("Invalid delimiter: {0}")]
    InvalidDelimiter(String),

    /// Empty file or no data to clean.
    #[error("Empty data: {0}")]
    EmptyData(String),

    /// Invalid cleaning rules or configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A pipeline stage could not complete.
    #[error("Stage '{stage}' failed: {message}")]
    Stage { stage: String, message: String },

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Regex compilation error.
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),
}

impl SiftError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SiftError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for sift operations.
pub type Result<T> = std::result::Result<T, SiftError>;
