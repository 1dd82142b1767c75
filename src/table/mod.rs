//! Table store
//!
//! Loads a CSV source once into an in-memory table and serves paginated
//! reads and positional or keyed insert/update/delete over it. Nothing is
//! written back to disk.

mod errors;
mod loader;
mod memory;
mod record;
mod store;

pub use errors::{TableError, TableResult};
pub use loader::CsvLoader;
pub use memory::Table;
pub use record::{page_bounds, Page, Record, Row, RowKey};
pub use store::TableStore;
