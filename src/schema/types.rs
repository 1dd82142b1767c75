//! Declared column schema
//!
//! Supported column types:
//! - string: UTF-8 string
//! - int: 64-bit signed integer
//! - float: 64-bit floating point (integers accepted)
//! - bool: Boolean

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Supported column types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    /// UTF-8 string
    String,
    /// 64-bit signed integer
    Int,
    /// 64-bit floating point
    Float,
    /// Boolean
    Bool,
}

impl ColumnType {
    /// Returns the type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            ColumnType::String => "string",
            ColumnType::Int => "int",
            ColumnType::Float => "float",
            ColumnType::Bool => "bool",
        }
    }
}

/// Column definition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDef {
    /// Column data type
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    /// Whether the column accepts null (and may be omitted on insert)
    #[serde(default)]
    pub nullable: bool,
}

impl ColumnDef {
    pub fn required(column_type: ColumnType) -> Self {
        Self {
            column_type,
            nullable: false,
        }
    }

    pub fn nullable(column_type: ColumnType) -> Self {
        Self {
            column_type,
            nullable: true,
        }
    }
}

/// Complete table schema: column name to definition.
///
/// Serialized as a plain JSON object so it can be declared inline in the
/// configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TableSchema {
    columns: BTreeMap<String, ColumnDef>,
}

impl TableSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style column declaration
    pub fn with_column(mut self, name: impl Into<String>, def: ColumnDef) -> Self {
        self.columns.insert(name.into(), def);
        self
    }

    /// Looks up a column definition
    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.get(name)
    }

    /// Iterates declared columns in name order
    pub fn columns(&self) -> impl Iterator<Item = (&String, &ColumnDef)> {
        self.columns.iter()
    }

    /// Declared column names in name order
    pub fn column_names(&self) -> Vec<String> {
        self.columns.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}
