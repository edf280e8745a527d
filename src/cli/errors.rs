//! CLI-specific error types
//!
//! Every CLI error ends the process with a non-zero status.

use std::io;

use thiserror::Error;

use crate::config::ConfigError;
use crate::listing::ListError;
use crate::store::StoreError;

/// CLI error
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    List(#[from] ListError),

    /// stdout or runtime I/O
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The HTTP server stopped with an error
    #[error("HTTP server failed: {0}")]
    Server(String),
}

impl CliError {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            CliError::Config(_) => "SCHOOLDESK_CLI_CONFIG_ERROR",
            CliError::Store(_) => "SCHOOLDESK_CLI_STORE_ERROR",
            CliError::List(_) => "SCHOOLDESK_CLI_LIST_ERROR",
            CliError::Io(_) => "SCHOOLDESK_CLI_IO_ERROR",
            CliError::Json(_) => "SCHOOLDESK_CLI_JSON_ERROR",
            CliError::Server(_) => "SCHOOLDESK_CLI_SERVER_ERROR",
        }
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;
