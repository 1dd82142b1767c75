//! Schema error types
//!
//! Error codes:
//! - SCHEMA_UNKNOWN_COLUMN (REJECT)
//! - SCHEMA_MISSING_COLUMN (REJECT)
//! - SCHEMA_NULL_VALUE (REJECT)
//! - SCHEMA_TYPE_MISMATCH (REJECT)

use std::fmt;

/// Schema-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaErrorCode {
    /// Record carries a column the schema does not declare
    UnknownColumn,
    /// Record omits a non-nullable column
    MissingColumn,
    /// Null written to a non-nullable column
    NullValue,
    /// Value does not match the declared column type
    TypeMismatch,
}

impl SchemaErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            SchemaErrorCode::UnknownColumn => "SCHEMA_UNKNOWN_COLUMN",
            SchemaErrorCode::MissingColumn => "SCHEMA_MISSING_COLUMN",
            SchemaErrorCode::NullValue => "SCHEMA_NULL_VALUE",
            SchemaErrorCode::TypeMismatch => "SCHEMA_TYPE_MISMATCH",
        }
    }
}

impl fmt::Display for SchemaErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Validation failure details
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationDetails {
    /// Offending column
    pub column: String,
    /// Expected type or condition
    pub expected: String,
    /// Actual value type or condition found
    pub actual: String,
}

impl ValidationDetails {
    pub fn new(
        column: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self {
            column: column.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }
}

impl fmt::Display for ValidationDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "column '{}': expected {}, got {}",
            self.column, self.expected, self.actual
        )
    }
}

/// Schema validation error with full context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaError {
    code: SchemaErrorCode,
    details: ValidationDetails,
}

impl SchemaError {
    pub fn unknown_column(column: impl Into<String>) -> Self {
        Self {
            code: SchemaErrorCode::UnknownColumn,
            details: ValidationDetails::new(column, "declared column", "undeclared column"),
        }
    }

    pub fn missing_column(column: impl Into<String>) -> Self {
        Self {
            code: SchemaErrorCode::MissingColumn,
            details: ValidationDetails::new(column, "column to be present", "missing"),
        }
    }

    pub fn null_value(column: impl Into<String>) -> Self {
        Self {
            code: SchemaErrorCode::NullValue,
            details: ValidationDetails::new(column, "non-null value", "null"),
        }
    }

    pub fn type_mismatch(
        column: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self {
            code: SchemaErrorCode::TypeMismatch,
            details: ValidationDetails::new(column, expected, actual),
        }
    }

    /// Returns the error code
    pub fn code(&self) -> SchemaErrorCode {
        self.code
    }

    /// Returns the failure details
    pub fn details(&self) -> &ValidationDetails {
        &self.details
    }

    /// Returns the offending column
    pub fn column(&self) -> &str {
        &self.details.column
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.details)
    }
}

impl std::error::Error for SchemaError {}

/// Result type for schema operations
pub type SchemaResult<T> = Result<T, SchemaError>;
