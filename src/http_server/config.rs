//! Listener settings for the list API
//!
//! `base_path` is where the list routes are mounted; `/health` always stays
//! at the root.

use std::net::{AddrParseError, SocketAddr};

use serde::{Deserialize, Serialize};

/// Mount point of the list routes
pub const DEFAULT_BASE_PATH: &str = "/api/v1";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpServerConfig {
    /// Interface to listen on; must be an IP literal
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Prefix for `/lists` and `/lists/{endpoint}`
    #[serde(default = "default_base_path")]
    pub base_path: String,

    /// Browser origins allowed to call the API. Empty allows any origin.
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_base_path() -> String {
    DEFAULT_BASE_PATH.to_string()
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            base_path: default_base_path(),
            cors_origins: Vec::new(),
        }
    }
}

impl HttpServerConfig {
    /// Address the listener binds to
    pub fn bind_addr(&self) -> Result<SocketAddr, AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }

    /// Checks the settings the router and listener depend on
    pub fn check(&self) -> Result<(), String> {
        self.bind_addr()
            .map_err(|e| format!("http.host '{}' is not an IP address: {}", self.host, e))?;
        let path = self.base_path.as_str();
        if !path.starts_with('/') || path.len() < 2 || path.ends_with('/') {
            return Err(format!(
                "http.base_path '{}' must start with '/' and not end with '/'",
                self.base_path
            ));
        }
        Ok(())
    }
}
