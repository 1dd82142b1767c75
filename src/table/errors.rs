//! Table error types

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::schema::SchemaError;

/// Result type for table operations
pub type TableResult<T> = Result<T, TableError>;

/// Table store errors
#[derive(Debug, Error)]
pub enum TableError {
    // ==================
    // Load Errors
    // ==================
    /// CSV source does not exist
    #[error("CSV source not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// CSV source exists but could not be read
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// CSV content could not be parsed
    #[error("Failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),

    /// A data row carries more fields than the header declares
    #[error("Row {line} has {found} fields, header declares {expected}")]
    MalformedRow {
        line: u64,
        expected: usize,
        found: usize,
    },

    // ==================
    // Operation Errors
    // ==================
    /// Row index or key does not address a row
    #[error("Record not found")]
    RowNotFound,

    /// Write rejected by the declared schema
    #[error("{0}")]
    Schema(#[from] SchemaError),
}
