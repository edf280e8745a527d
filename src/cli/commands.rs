//! CLI command implementations
//!
//! Every command loads configuration first. `serve` and `check-config`
//! require the file; `list` and `endpoints` fall back to defaults when it
//! is missing.

use std::path::Path;
use std::sync::Arc;

use tracing::info;

use crate::config::AppConfig;
use crate::http_server::HttpServer;
use crate::listing::ListService;
use crate::observability::{init_tracing, Event};
use crate::query::RawParams;
use crate::store::InMemoryStore;

use super::args::Command;
use super::errors::{CliError, CliResult};
use super::io::write_json;

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Serve { config } => serve(&config),
        Command::List {
            config,
            endpoint,
            tenant,
            params,
        } => list(&config, &endpoint, tenant.as_deref(), params),
        Command::Endpoints { config } => endpoints(&config),
        Command::CheckConfig { config } => check_config(&config),
    }
}

/// Boot and serve HTTP until the listener fails
pub fn serve(config_path: &Path) -> CliResult<()> {
    let config = AppConfig::load(config_path)?;
    init_tracing(&config.log);
    info!(event = %Event::BootStart, version = env!("CARGO_PKG_VERSION"), "starting");
    info!(
        event = %Event::ConfigLoaded,
        path = %config_path.display(),
        endpoints = config.endpoints.len(),
        "configuration loaded"
    );

    let service = build_service(&config)?;
    let server = HttpServer::new(config.http.clone(), service);

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        server
            .start()
            .await
            .map_err(|e| CliError::Server(e.to_string()))
    })
}

/// One-shot list request; prints the envelope
pub fn list(
    config_path: &Path,
    endpoint: &str,
    tenant: Option<&str>,
    params: Vec<(String, String)>,
) -> CliResult<()> {
    let config = AppConfig::load_or_default(config_path)?;
    init_tracing(&config.log);

    let service = build_service(&config)?;
    let params = RawParams::from_pairs(params);

    let rt = tokio::runtime::Runtime::new()?;
    let envelope = rt.block_on(service.list(endpoint, tenant, &params))?;
    write_json(&envelope)
}

/// Print endpoint names, one per line
pub fn endpoints(config_path: &Path) -> CliResult<()> {
    let config = AppConfig::load_or_default(config_path)?;
    for name in config.endpoints.names() {
        println!("{}", name);
    }
    Ok(())
}

/// Validate configuration without starting anything
pub fn check_config(config_path: &Path) -> CliResult<()> {
    let config = AppConfig::load(config_path)?;
    println!(
        "{}: ok ({} endpoints)",
        config_path.display(),
        config.endpoints.len()
    );
    Ok(())
}

/// Store seeded from the configured data file, wrapped in a list service
pub fn build_service(config: &AppConfig) -> CliResult<ListService> {
    let store = match &config.data_file {
        Some(path) => {
            let store = InMemoryStore::load_seed_file(path)?;
            info!(
                event = %Event::SeedLoaded,
                path = %path.display(),
                documents = store.len(),
                "seed loaded"
            );
            store
        }
        None => InMemoryStore::new(),
    };
    Ok(ListService::new(Arc::new(store), config.endpoints.clone()))
}
