//! # Listing Errors

use thiserror::Error;

use crate::store::StoreError;

/// Result type for list operations
pub type ListResult<T> = Result<T, ListError>;

/// List request errors
#[derive(Debug, Error)]
pub enum ListError {
    /// No endpoint with this name is configured
    #[error("Unknown list endpoint: {0}")]
    UnknownEndpoint(String),

    /// The endpoint is tenant-scoped and no tenant was given
    #[error("Endpoint '{0}' requires a tenant")]
    MissingTenant(String),

    /// The store failed; carried unchanged
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ListError {
    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            ListError::UnknownEndpoint(_) => "LIST_UNKNOWN_ENDPOINT",
            ListError::MissingTenant(_) => "LIST_MISSING_TENANT",
            ListError::Store(e) => e.code(),
        }
    }
}
