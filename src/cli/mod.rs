//! CLI module for csvstore
//!
//! Provides command-line interface for:
//! - serve: Load the CSV source and serve it over HTTP
//! - export: Load the CSV source and print it as JSON

mod args;
mod commands;
mod config;
mod errors;

pub use args::{Cli, Command};
pub use commands::{build_store, export, run_command, serve};
pub use config::{Config, DEFAULT_CONFIG_PATH};
pub use errors::{CliError, CliErrorCode, CliResult};

use tracing_subscriber::EnvFilter;

/// Install the log subscriber and run the command line.
///
/// Logs go to stderr so `export` output on stdout stays clean. Filtering
/// follows `RUST_LOG`, defaulting to `info`.
pub fn run() -> CliResult<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    commands::run()
}
