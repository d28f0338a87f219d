//! CLI command implementations
//!
//! `serve` follows a fixed boot sequence:
//! 1. Resolve configuration (defaults, file, environment, flags)
//! 2. Initialize logging
//! 3. Open the store; failure aborts startup
//! 4. Bind the listener and serve until shutdown
//! 5. Close the store

use std::io::{self, Write};
use std::sync::Arc;

use serde::Serialize;

use crate::http_server::{HttpServer, ServerConfig};
use crate::observability::{init_logging, LogConfig};
use crate::storage::{connect, DocumentStore, EmbeddedStore};

use super::args::{Cli, Command, ConfigArgs};
use super::errors::{CliError, CliErrorCode, CliResult};

/// Parse arguments and run the selected command
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    run_command(cli.command)
}

/// Run a parsed command
pub fn run_command(command: Command) -> CliResult<()> {
    match command {
        Command::Serve {
            overrides,
            host,
            port,
        } => {
            let mut config = resolve_config(&overrides)?;
            if let Some(host) = host {
                config.host = host;
            }
            if let Some(port) = port {
                config.port = port;
            }
            serve(config)
        }
        Command::Check { overrides } => {
            let config = resolve_config(&overrides)?;
            let report = check(&config)?;
            let mut stdout = io::stdout().lock();
            serde_json::to_writer_pretty(&mut stdout, &report)?;
            writeln!(stdout)?;
            Ok(())
        }
    }
}

/// Merge the config file, the environment and the shared flags
pub fn resolve_config(overrides: &ConfigArgs) -> CliResult<ServerConfig> {
    let base = match &overrides.config {
        Some(path) => ServerConfig::from_file(path)?,
        None => ServerConfig::default(),
    };

    let mut config = base.apply_env()?;
    if let Some(uri) = &overrides.store_uri {
        config.store_uri = uri.clone();
    }
    Ok(config)
}

/// Open the store named by the config.
///
/// Any failure here is fatal to startup.
pub fn open_store(config: &ServerConfig) -> CliResult<EmbeddedStore> {
    match connect(&config.store_uri) {
        Ok(store) => {
            tracing::info!(uri = %store.uri(), "store opened");
            Ok(store)
        }
        Err(e) => {
            tracing::error!(
                uri = %config.store_uri,
                code = e.code(),
                fatal = e.is_fatal(),
                error = %e,
                "failed to open store"
            );
            Err(e.into())
        }
    }
}

/// Boot the service and block until it shuts down
pub fn serve(config: ServerConfig) -> CliResult<()> {
    init_logging(&LogConfig {
        level: config.log_level.clone(),
        json: config.log_json,
    });

    let store = Arc::new(open_store(&config)?);
    let students = store.document_count(crate::students::COLLECTION)?;
    tracing::info!(students, "store ready");

    let runtime = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::new(CliErrorCode::IoError, format!("Failed to start runtime: {}", e)))?;

    let server = HttpServer::new(config, store);
    runtime.block_on(server.start())?;
    Ok(())
}

/// Result of `studentdb check`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckReport {
    pub store_uri: String,
    pub collections: Vec<CollectionCount>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollectionCount {
    pub name: String,
    pub documents: usize,
}

/// Open the store, which verifies every checksum, and report its contents
pub fn check(config: &ServerConfig) -> CliResult<CheckReport> {
    let store = connect(&config.store_uri)?;
    let collections = store
        .collection_counts()?
        .into_iter()
        .map(|(name, documents)| CollectionCount { name, documents })
        .collect();
    store.close()?;

    Ok(CheckReport {
        store_uri: store.uri().to_string(),
        collections,
    })
}
