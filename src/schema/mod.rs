//! Optional declared schema for the table.
//!
//! When a schema is configured, every insert and update is validated against
//! it before the table is touched. Without one, the table accepts any record.

mod errors;
mod types;
mod validator;

pub use errors::{SchemaError, SchemaErrorCode, SchemaResult, ValidationDetails};
pub use types::{ColumnDef, ColumnType, TableSchema};
pub use validator::{json_type_name, SchemaValidator};
