//! CLI argument definitions using clap
//!
//! Commands:
//! - schooldesk serve --config <path>
//! - schooldesk list --config <path> --endpoint <name> [--tenant <id>] [--param k=v]...
//! - schooldesk endpoints --config <path>
//! - schooldesk check-config --config <path>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// schooldesk - list endpoints for a multi-tenant school backend
#[derive(Parser, Debug)]
#[command(name = "schooldesk")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the HTTP server
    Serve {
        /// Path to configuration file
        #[arg(long, default_value = "./schooldesk.json")]
        config: PathBuf,
    },

    /// Fetch one page of a list endpoint and print it as JSON
    List {
        /// Path to configuration file
        #[arg(long, default_value = "./schooldesk.json")]
        config: PathBuf,

        /// Endpoint name
        #[arg(long)]
        endpoint: String,

        /// Tenant for scoped endpoints
        #[arg(long)]
        tenant: Option<String>,

        /// Request parameter as key=value; repeat a key for several values
        #[arg(long = "param", value_parser = parse_param)]
        params: Vec<(String, String)>,
    },

    /// Print configured endpoint names
    Endpoints {
        /// Path to configuration file
        #[arg(long, default_value = "./schooldesk.json")]
        config: PathBuf,
    },

    /// Load and validate a configuration file
    CheckConfig {
        /// Path to configuration file
        #[arg(long, default_value = "./schooldesk.json")]
        config: PathBuf,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

/// Split `key=value` at the first `=`
fn parse_param(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected key=value, got '{}'", raw)),
    }
}
