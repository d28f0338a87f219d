//! CLI module for studentdb
//!
//! Provides command-line interface for:
//! - serve: open the store and run the HTTP API
//! - check: verify the store and print document counts

mod args;
mod commands;
mod errors;

pub use args::{Cli, Command, ConfigArgs};
pub use commands::{check, open_store, resolve_config, run, run_command, serve, CheckReport};
pub use errors::{CliError, CliErrorCode, CliResult};
