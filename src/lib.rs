//! csvstore - An in-memory tabular data service backed by a CSV file
//!
//! The CSV source is read once at startup into a [`table::TableStore`];
//! [`http_server::HttpServer`] exposes paginated reads, insert, update,
//! delete and export over JSON. Writes are never persisted.

pub mod cli;
pub mod http_server;
pub mod observability;
pub mod schema;
pub mod table;
