//! CLI command implementations
//!
//! `serve` loads the CSV source once and enters the HTTP serving loop.
//! `export` loads the source and prints it; load failures are fatal there,
//! unlike in `serve` where the table falls back to empty.

use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use super::args::Command;
use super::config::Config;
use super::errors::{CliError, CliResult};
use crate::http_server::HttpServer;
use crate::observability::{log_event, log_event_with_fields, Event};
use crate::table::{CsvLoader, TableStore};

/// Parse arguments and run the selected command
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Serve { config, csv, port } => {
            let mut config = Config::resolve(config.as_deref())?;
            apply_overrides(&mut config, csv, port);
            serve(config)
        }
        Command::Export { config, csv } => {
            let mut config = Config::resolve(config.as_deref())?;
            apply_overrides(&mut config, csv, None);
            export(&config, &mut io::stdout().lock())
        }
    }
}

fn apply_overrides(config: &mut Config, csv: Option<PathBuf>, port: Option<u16>) {
    if let Some(csv) = csv {
        config.csv_path = csv;
    }
    if let Some(port) = port {
        config.server.port = port;
    }
}

/// Build the table store described by `config`.
///
/// A missing or unreadable CSV source yields an empty table.
pub fn build_store(config: &Config) -> CliResult<TableStore> {
    let loader = CsvLoader::new().with_delimiter(config.delimiter_byte()?);
    let table = loader.load(&config.csv_path);

    Ok(match &config.schema {
        Some(schema) => TableStore::with_schema(table, schema.clone()),
        None => TableStore::new(table),
    })
}

/// Load the CSV source and serve it until Ctrl-C
pub fn serve(config: Config) -> CliResult<()> {
    log_event(Event::StartupBegin);
    log_event_with_fields(
        Event::ConfigLoaded,
        &[
            ("csv_path", config.csv_path.display().to_string().as_str()),
            ("schema", if config.schema.is_some() { "declared" } else { "none" }),
        ],
    );

    let store = Arc::new(build_store(&config)?);
    let server = HttpServer::with_config(config.server, store);

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::boot_failed(format!("Failed to create tokio runtime: {}", e)))?;

    rt.block_on(async {
        server
            .start()
            .await
            .map_err(|e| CliError::boot_failed(format!("HTTP server failed: {}", e)))
    })
}

/// Load the CSV source and write every record as a JSON array
pub fn export<W: Write>(config: &Config, out: &mut W) -> CliResult<()> {
    let loader = CsvLoader::new().with_delimiter(config.delimiter_byte()?);
    let table = loader
        .try_load(&config.csv_path)
        .map_err(|e| CliError::export_failed(e.to_string()))?;

    serde_json::to_writer_pretty(&mut *out, &table.export())?;
    writeln!(out)?;
    out.flush()?;

    Ok(())
}
