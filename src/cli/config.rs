//! Configuration file
//!
//! A JSON object; every field has a default, so `{}` is a valid file.
//!
//! ```json
//! {
//!   "csv_path": "data.csv",
//!   "delimiter": ",",
//!   "host": "0.0.0.0",
//!   "port": 5000,
//!   "cors_origins": [],
//!   "default_per_page": 25,
//!   "schema": {"name": {"type": "string"}}
//! }
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::errors::{CliError, CliResult};
use crate::http_server::HttpServerConfig;
use crate::schema::TableSchema;

/// Configuration file looked up when `--config` is not given
pub const DEFAULT_CONFIG_PATH: &str = "./csvstore.json";

/// Configuration file structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// CSV source read once at startup (default: "data.csv")
    #[serde(default = "default_csv_path")]
    pub csv_path: PathBuf,

    /// Single-character field delimiter (default: ",")
    #[serde(default = "default_delimiter")]
    pub delimiter: String,

    /// HTTP server settings
    #[serde(flatten)]
    pub server: HttpServerConfig,

    /// Declared column schema; absent means any record is accepted
    #[serde(default)]
    pub schema: Option<TableSchema>,
}

fn default_csv_path() -> PathBuf {
    PathBuf::from("data.csv")
}

fn default_delimiter() -> String {
    ",".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            csv_path: default_csv_path(),
            delimiter: default_delimiter(),
            server: HttpServerConfig::default(),
            schema: None,
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            CliError::config_error(format!("Failed to read config {}: {}", path.display(), e))
        })?;
        Self::from_json(&content)
    }

    /// Resolve configuration from an optional `--config` flag.
    ///
    /// An explicit path must exist. Without one, the default path is used if
    /// present, otherwise every setting takes its default.
    pub fn resolve(explicit: Option<&Path>) -> CliResult<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        match fs::read_to_string(DEFAULT_CONFIG_PATH) {
            Ok(content) => Self::from_json(&content),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(CliError::config_error(format!(
                "Failed to read config {}: {}",
                DEFAULT_CONFIG_PATH, e
            ))),
        }
    }

    /// Parse and validate configuration JSON
    pub fn from_json(content: &str) -> CliResult<Self> {
        let config: Config = serde_json::from_str(content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration
    fn validate(&self) -> CliResult<()> {
        self.delimiter_byte()?;

        if self.csv_path.as_os_str().is_empty() {
            return Err(CliError::config_error("csv_path must not be empty"));
        }

        if self.server.default_per_page <= 0 {
            return Err(CliError::config_error("default_per_page must be > 0"));
        }

        Ok(())
    }

    /// Delimiter as the single byte the CSV reader expects
    pub fn delimiter_byte(&self) -> CliResult<u8> {
        match self.delimiter.as_bytes() {
            [b] if b.is_ascii() => Ok(*b),
            _ => Err(CliError::config_error(format!(
                "Invalid delimiter: '{}'. Must be a single ASCII character.",
                self.delimiter
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ColumnType;
    use tempfile::TempDir;

    #[test]
    fn test_empty_object_is_all_defaults() {
        let config = Config::from_json("{}").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.delimiter_byte().unwrap(), b',');
    }

    #[test]
    fn test_flattened_server_fields() {
        let config =
            Config::from_json(r#"{"csv_path": "q.csv", "port": 8080, "default_per_page": 10}"#)
                .unwrap();
        assert_eq!(config.csv_path, PathBuf::from("q.csv"));
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.default_per_page, 10);
    }

    #[test]
    fn test_schema_section() {
        let config =
            Config::from_json(r#"{"schema": {"respuesta": {"type": "int"}}}"#).unwrap();
        let schema = config.schema.unwrap();
        assert_eq!(
            schema.column("respuesta").unwrap().column_type,
            ColumnType::Int
        );
    }

    #[test]
    fn test_invalid_delimiter() {
        assert!(Config::from_json(r#"{"delimiter": ";;"}"#).is_err());
        assert!(Config::from_json(r#"{"delimiter": ""}"#).is_err());
        assert_eq!(
            Config::from_json(r#"{"delimiter": "\t"}"#)
                .unwrap()
                .delimiter_byte()
                .unwrap(),
            b'\t'
        );
    }

    #[test]
    fn test_invalid_page_size() {
        assert!(Config::from_json(r#"{"default_per_page": 0}"#).is_err());
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let tmp = TempDir::new().unwrap();
        let result = Config::resolve(Some(&tmp.path().join("missing.json")));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_from_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("csvstore.json");
        fs::write(&path, r#"{"port": 7000}"#).unwrap();
        assert_eq!(Config::load(&path).unwrap().server.port, 7000);
    }
}
