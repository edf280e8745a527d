//! # Configuration
//!
//! One JSON file configures the HTTP listener, logging, optional seed data
//! and the list endpoint catalog. Every field has a default, so `{}` is a
//! complete configuration.
//!
//! ```json
//! {
//!   "http": { "host": "127.0.0.1", "port": 5000, "base_path": "/api/v1", "cors_origins": [] },
//!   "log": { "filter": "info,schooldesk=debug", "format": "json" },
//!   "data_file": "./seed.json",
//!   "endpoints": [ { "name": "levels", "collection": "levels", "scope_field": "schoolId" } ]
//! }
//! ```

mod errors;

pub use errors::{ConfigError, ConfigResult};

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::http_server::HttpServerConfig;
use crate::listing::Catalog;
use crate::observability::LogConfig;

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub http: HttpServerConfig,

    #[serde(default)]
    pub log: LogConfig,

    /// Seed file loaded into the store at startup
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_file: Option<PathBuf>,

    /// List endpoints; the built-in catalog when absent
    #[serde(default)]
    pub endpoints: Catalog,
}

impl AppConfig {
    /// Load configuration from file
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_json(&content)?;
        config.resolve_data_file(path);
        Ok(config)
    }

    /// Load from `path` if it exists, otherwise use defaults
    pub fn load_or_default(path: &Path) -> ConfigResult<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse and validate configuration text
    pub fn from_json(content: &str) -> ConfigResult<Self> {
        let config: AppConfig = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check listener settings and the endpoint catalog
    pub fn validate(&self) -> ConfigResult<()> {
        self.http.check().map_err(ConfigError::invalid)?;

        let mut seen = HashSet::new();
        for endpoint in self.endpoints.iter() {
            if endpoint.name.trim().is_empty() {
                return Err(ConfigError::invalid("endpoint name must not be empty"));
            }
            if !seen.insert(endpoint.name.as_str()) {
                return Err(ConfigError::invalid(format!(
                    "duplicate endpoint name '{}'",
                    endpoint.name
                )));
            }
            if endpoint.collection.trim().is_empty() {
                return Err(ConfigError::invalid(format!(
                    "endpoint '{}' has an empty collection",
                    endpoint.name
                )));
            }
            if endpoint.default_limit == 0 {
                return Err(ConfigError::invalid(format!(
                    "endpoint '{}': default_limit must be > 0",
                    endpoint.name
                )));
            }
            if let Some(max) = endpoint.max_limit {
                if max < endpoint.default_limit {
                    return Err(ConfigError::invalid(format!(
                        "endpoint '{}': max_limit {} is below default_limit {}",
                        endpoint.name, max, endpoint.default_limit
                    )));
                }
            }
        }
        Ok(())
    }

    /// A relative seed path is taken relative to the config file
    fn resolve_data_file(&mut self, config_path: &Path) {
        let Some(data_file) = &self.data_file else {
            return;
        };
        if data_file.is_relative() {
            if let Some(dir) = config_path.parent() {
                self.data_file = Some(dir.join(data_file));
            }
        }
    }
}
