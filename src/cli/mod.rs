//! CLI module
//!
//! Provides command-line interface for:
//! - serve: Load configuration, seed the store, serve HTTP
//! - list: One-shot list request printed as JSON
//! - endpoints: Print configured endpoint names
//! - check-config: Validate a configuration file

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{build_service, check_config, endpoints, list, run, run_command, serve};
pub use errors::{CliError, CliResult};
pub use io::{write_json, write_json_to};
