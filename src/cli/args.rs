//! CLI argument definitions using clap
//!
//! Commands:
//! - studentdb serve [--config <path>] [--host <host>] [--port <port>] [--store-uri <uri>]
//! - studentdb check [--config <path>] [--store-uri <uri>]

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// studentdb - student records over HTTP
#[derive(Parser, Debug)]
#[command(name = "studentdb")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Open the store and serve the student API
    Serve {
        #[command(flatten)]
        overrides: ConfigArgs,

        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to
        #[arg(long)]
        port: Option<u16>,
    },

    /// Open the store, verify every record and print document counts
    Check {
        #[command(flatten)]
        overrides: ConfigArgs,
    },
}

/// Options shared by every command
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// Path to a JSON configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Store connection string (memory:// or file://<dir>)
    #[arg(long)]
    pub store_uri: Option<String>,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
