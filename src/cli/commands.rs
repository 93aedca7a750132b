//! CLI command implementations
//!
//! Every command loads the configuration first, then builds the search
//! service the same way the server does, so `query` answers exactly what
//! `POST /search-x.api` would.

use std::path::Path;
use std::sync::Arc;

use serde_json::json;

use crate::executor::FanOutExecutor;
use crate::geo::{base_postal_code, GeoDataset};
use crate::http_server::HttpServer;
use crate::observability::{log_event, log_event_with_fields, Event};
use crate::planner::QueryBuilder;
use crate::search::SearchService;
use crate::store::MemoryStore;

use super::args::Command;
use super::config::Config;
use super::errors::{CliError, CliResult};
use super::io::{read_request, write_error, write_response};

/// Main entry point for CLI
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Serve { config, port } => serve(&config, port),
        Command::Query { config } => query(&config),
        Command::Lookup {
            postal_code,
            config,
        } => lookup(&postal_code, &config),
    }
}

/// Build the search service described by a configuration
///
/// A missing or unreadable geo dataset is not fatal; postal code searches
/// then return no listings. A configured listings file that cannot be
/// loaded is.
pub fn build_service(config: &Config) -> CliResult<SearchService<MemoryStore>> {
    let geo = GeoDataset::load_or_empty(&config.geo_dataset_path());

    let store = match config.listings_path() {
        Some(path) => {
            let store = MemoryStore::from_listings_file(&path, config.store.page_size)
                .map_err(|e| CliError::boot_failed(format!("Failed to load listings: {}", e)))?;
            log_event_with_fields(
                Event::ListingsLoaded,
                &[
                    ("path", &path.display().to_string()),
                    ("listings", &store.len().to_string()),
                ],
            );
            store
        }
        None => MemoryStore::new(config.store.page_size),
    };

    let executor = FanOutExecutor::new(Arc::new(store))
        .with_builder(QueryBuilder::new(config.store.table.clone()))
        .with_retry(config.retry)
        .with_policy(config.failure_policy());

    Ok(SearchService::new(executor, Arc::new(geo)).with_timeout(config.query_timeout()))
}

fn load_config(config_path: &Path) -> CliResult<Config> {
    let config = Config::load(config_path)?;
    log_event_with_fields(
        Event::ConfigLoaded,
        &[("config", &config_path.display().to_string())],
    );
    Ok(config)
}

/// Start the HTTP search server
pub fn serve(config_path: &Path, port: Option<u16>) -> CliResult<()> {
    log_event(Event::BootStart);

    let mut config = load_config(config_path)?;
    if let Some(port) = port {
        config.http.port = port;
    }

    let service = Arc::new(build_service(&config)?);
    let server = HttpServer::with_config(config.http.clone(), service);

    log_event_with_fields(Event::BootComplete, &[("addr", &server.socket_addr())]);

    // Start the async runtime and run the server
    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::boot_failed(format!("Failed to create tokio runtime: {}", e)))?;

    rt.block_on(async {
        server
            .start()
            .await
            .map_err(|e| CliError::boot_failed(format!("HTTP server failed: {}", e)))
    })?;

    Ok(())
}

/// Run one search read from stdin
///
/// Search failures are written as error responses; the command itself only
/// fails when it cannot boot or do I/O.
pub fn query(config_path: &Path) -> CliResult<()> {
    let config = load_config(config_path)?;
    let service = build_service(&config)?;

    let request = read_request()?;

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::boot_failed(format!("Failed to create tokio runtime: {}", e)))?;

    match rt.block_on(service.search(&request)) {
        Ok(outcome) => write_response(json!({
            "request_id": outcome.request_id,
            "listings": outcome.listings,
            "consumed_capacity": outcome.consumed_capacity,
            "partitions": outcome.partitions,
            "partial": outcome.is_partial(),
        })),
        Err(e) => write_error(e.code(), &e.to_string()),
    }
}

/// Print the bounding rectangle of a postal code
pub fn lookup(postal_code: &str, config_path: &Path) -> CliResult<()> {
    let config = load_config(config_path)?;

    let base = base_postal_code(postal_code).ok_or_else(|| {
        CliError::invalid_input(format!("'{}' is not a postal code", postal_code))
    })?;

    let geo = GeoDataset::load_or_empty(&config.geo_dataset_path());
    let rectangle = geo.bounding_rectangle(base);

    write_response(json!({
        "postal_code": base,
        "found": !rectangle.is_zero(),
        "rectangle": rectangle,
    }))
}
