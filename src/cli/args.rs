//! CLI argument definitions using clap
//!
//! Commands:
//! - csvstore serve [--config <path>] [--csv <path>] [--port <n>]
//! - csvstore export [--config <path>] [--csv <path>]

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// csvstore - An in-memory tabular data service backed by a CSV file
#[derive(Parser, Debug)]
#[command(name = "csvstore")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Load the CSV source and serve it over HTTP
    Serve {
        /// Path to configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// CSV source, overriding the configuration file
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Port to bind, overriding the configuration file
        #[arg(long)]
        port: Option<u16>,
    },

    /// Load the CSV source and print every record as a JSON array
    Export {
        /// Path to configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// CSV source, overriding the configuration file
        #[arg(long)]
        csv: Option<PathBuf>,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serve_overrides() {
        let cli = Cli::try_parse_from([
            "csvstore", "serve", "--csv", "questions.csv", "--port", "8080",
        ])
        .unwrap();

        match cli.command {
            Command::Serve { config, csv, port } => {
                assert!(config.is_none());
                assert_eq!(csv, Some(PathBuf::from("questions.csv")));
                assert_eq!(port, Some(8080));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_export_with_config() {
        let cli = Cli::try_parse_from(["csvstore", "export", "--config", "cfg.json"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Export { config: Some(_), csv: None }
        ));
    }

    #[test]
    fn test_invalid_port_rejected() {
        assert!(Cli::try_parse_from(["csvstore", "serve", "--port", "99999"]).is_err());
    }
}
