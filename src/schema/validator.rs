//! Record validation against a declared schema
//!
//! Validation semantics:
//! - No undeclared columns
//! - Values match the declared type exactly (int is accepted for float)
//! - Null only in nullable columns
//! - Full records must carry every non-nullable column; partial updates need not

use serde_json::{Map, Value};

use super::errors::{SchemaError, SchemaResult};
use super::types::{ColumnDef, ColumnType, TableSchema};

/// Schema validator. Does not mutate records.
pub struct SchemaValidator<'a> {
    schema: &'a TableSchema,
}

impl<'a> SchemaValidator<'a> {
    pub fn new(schema: &'a TableSchema) -> Self {
        Self { schema }
    }

    /// Validates a complete record, as written by an insert.
    pub fn validate_record(&self, record: &Map<String, Value>) -> SchemaResult<()> {
        self.validate_present_columns(record)?;

        for (name, def) in self.schema.columns() {
            if !def.nullable && !record.contains_key(name) {
                return Err(SchemaError::missing_column(name.as_str()));
            }
        }

        Ok(())
    }

    /// Validates a partial record, as written by an update.
    pub fn validate_partial(&self, partial: &Map<String, Value>) -> SchemaResult<()> {
        self.validate_present_columns(partial)
    }

    fn validate_present_columns(&self, record: &Map<String, Value>) -> SchemaResult<()> {
        for (name, value) in record {
            let def = self
                .schema
                .column(name)
                .ok_or_else(|| SchemaError::unknown_column(name.as_str()))?;
            validate_value(name, def, value)?;
        }
        Ok(())
    }
}

fn validate_value(column: &str, def: &ColumnDef, value: &Value) -> SchemaResult<()> {
    if value.is_null() {
        if def.nullable {
            return Ok(());
        }
        return Err(SchemaError::null_value(column));
    }

    let matches = match def.column_type {
        ColumnType::String => value.is_string(),
        ColumnType::Int => value.is_i64() || value.is_u64(),
        ColumnType::Float => value.is_number(),
        ColumnType::Bool => value.is_boolean(),
    };

    if matches {
        Ok(())
    } else {
        Err(SchemaError::type_mismatch(
            column,
            def.column_type.type_name(),
            json_type_name(value),
        ))
    }
}

/// Returns the JSON type name of a value
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "int",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
