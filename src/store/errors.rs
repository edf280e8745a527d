//! # Store Errors
//!
//! Failures raised by a document store. The query builders hand these back
//! to their caller unchanged.

use thiserror::Error;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Document store errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store cannot serve requests right now
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// Seed data is malformed
    #[error("Invalid seed data: {0}")]
    Seed(String),

    /// Reading seed data failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Seed data is not valid JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl StoreError {
    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::Unavailable(_) => "STORE_UNAVAILABLE",
            StoreError::Seed(_) => "STORE_SEED",
            StoreError::Io(_) => "STORE_IO",
            StoreError::Json(_) => "STORE_JSON",
        }
    }
}
