//! CSV source loading
//!
//! Reads a delimited file with a header row into a [`Table`]. Cell values are
//! typed per column: a column whose non-missing cells all parse as integers
//! becomes `int`, integers and decimals together become `float`,
//! `true`/`false` becomes `bool`, anything else keeps its text. Empty cells
//! and the usual NA markers become `null` in every column.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use csv::{ReaderBuilder, StringRecord};
use serde_json::{Number, Value};

use super::errors::{TableError, TableResult};
use super::memory::Table;
use super::record::Record;
use crate::observability::{log_event_with_fields, Event};

/// Cell text treated as a missing value
const NA_MARKERS: &[&str] = &["NA", "N/A", "NaN", "nan", "NULL", "null", "None", "#N/A"];

/// CSV loader
#[derive(Debug, Clone)]
pub struct CsvLoader {
    /// Field delimiter (default: comma)
    delimiter: u8,
}

impl Default for CsvLoader {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

impl CsvLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set custom delimiter
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Loads `path`, falling back to an empty table on any failure.
    ///
    /// The failure is logged and never surfaced to the caller.
    pub fn load(&self, path: &Path) -> Table {
        let path_str = path.display().to_string();
        match self.try_load(path) {
            Ok(table) => {
                log_event_with_fields(
                    Event::TableLoaded,
                    &[
                        ("path", path_str.as_str()),
                        ("rows", table.len().to_string().as_str()),
                        ("columns", table.columns().len().to_string().as_str()),
                    ],
                );
                table
            }
            Err(e) => {
                log_event_with_fields(
                    Event::LoadFailed,
                    &[("path", path_str.as_str()), ("error", e.to_string().as_str())],
                );
                Table::new()
            }
        }
    }

    /// Loads `path`, returning the failure
    pub fn try_load(&self, path: &Path) -> TableResult<Table> {
        let file = File::open(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => TableError::FileNotFound(path.to_path_buf()),
            _ => TableError::Io {
                path: path.to_path_buf(),
                source: e,
            },
        })?;
        self.parse_reader(file)
    }

    /// Parses CSV content from a reader
    pub fn parse_reader<R: Read>(&self, reader: R) -> TableResult<Table> {
        let mut reader = ReaderBuilder::new()
            .delimiter(self.delimiter)
            .flexible(true)
            .from_reader(reader);

        let columns = dedupe_headers(reader.headers()?.iter().map(str::trim));

        let mut raw_rows = Vec::new();
        for result in reader.records() {
            let record = result?;
            if record.len() > columns.len() {
                return Err(TableError::MalformedRow {
                    line: record.position().map_or(0, |p| p.line()),
                    expected: columns.len(),
                    found: record.len(),
                });
            }
            raw_rows.push(record);
        }

        let kinds = infer_column_kinds(columns.len(), &raw_rows);
        let records = raw_rows
            .iter()
            .map(|raw| build_record(&columns, &kinds, raw))
            .collect();

        Ok(Table::from_records(columns, records))
    }

    /// Parses CSV content from a string
    pub fn parse_str(&self, content: &str) -> TableResult<Table> {
        self.parse_reader(content.as_bytes())
    }
}

/// Renames repeated header names to `name.1`, `name.2`, ... so every column
/// keeps its own cells.
fn dedupe_headers<'a>(headers: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut columns: Vec<String> = Vec::new();
    for header in headers {
        let mut name = header.to_string();
        let mut suffix = 1;
        while columns.contains(&name) {
            name = format!("{}.{}", header, suffix);
            suffix += 1;
        }
        columns.push(name);
    }
    columns
}

/// Inferred value kind of a column, widened as cells are seen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnKind {
    /// No non-missing cell seen yet
    Empty,
    Int,
    Float,
    Bool,
    Text,
}

impl ColumnKind {
    fn widen(self, cell: ColumnKind) -> ColumnKind {
        use ColumnKind::*;
        match (self, cell) {
            (Empty, k) | (k, Empty) => k,
            (a, b) if a == b => a,
            (Int, Float) | (Float, Int) => Float,
            _ => Text,
        }
    }
}

fn is_missing(raw: &str) -> bool {
    raw.trim().is_empty() || NA_MARKERS.contains(&raw.trim())
}

fn classify(raw: &str) -> ColumnKind {
    let trimmed = raw.trim();
    if is_missing(raw) {
        ColumnKind::Empty
    } else if trimmed.parse::<i64>().is_ok() {
        ColumnKind::Int
    } else if trimmed.parse::<f64>().map_or(false, f64::is_finite) {
        ColumnKind::Float
    } else if parse_bool(trimmed).is_some() {
        ColumnKind::Bool
    } else {
        ColumnKind::Text
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    if s.eq_ignore_ascii_case("true") {
        Some(true)
    } else if s.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

fn infer_column_kinds(width: usize, rows: &[StringRecord]) -> Vec<ColumnKind> {
    let mut kinds = vec![ColumnKind::Empty; width];
    for row in rows {
        for (kind, cell) in kinds.iter_mut().zip(row.iter()) {
            *kind = kind.widen(classify(cell));
        }
    }
    kinds
}

fn build_record(columns: &[String], kinds: &[ColumnKind], raw: &StringRecord) -> Record {
    columns
        .iter()
        .zip(kinds)
        .enumerate()
        .map(|(i, (column, kind))| {
            let value = raw
                .get(i)
                .map_or(Value::Null, |cell| convert_cell(cell, *kind));
            (column.clone(), value)
        })
        .collect()
}

fn convert_cell(raw: &str, kind: ColumnKind) -> Value {
    if is_missing(raw) {
        return Value::Null;
    }

    let trimmed = raw.trim();
    match kind {
        ColumnKind::Int => trimmed
            .parse::<i64>()
            .map(Value::from)
            .unwrap_or_else(|_| Value::String(raw.to_string())),
        ColumnKind::Float => trimmed
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .unwrap_or_else(|| Value::String(raw.to_string())),
        ColumnKind::Bool => parse_bool(trimmed)
            .map(Value::Bool)
            .unwrap_or_else(|| Value::String(raw.to_string())),
        ColumnKind::Empty | ColumnKind::Text => Value::String(raw.to_string()),
    }
}
