//! # HTTP Server Module
//!
//! Axum server exposing the table store over JSON.
//!
//! # Endpoints
//!
//! - `GET /data?page=&per_page=` - Paginated records
//! - `POST /data` - Append a record
//! - `GET|PUT|DELETE /data/:row_id` - Positional access
//! - `GET /export` - Every record
//! - `GET /rows`, `GET|PUT|DELETE /rows/:key` - Stable key access
//! - `GET /columns` - Column set and declared schema
//! - `GET /health`, `GET /metrics` - Observability

pub mod config;
pub mod data_routes;
pub mod errors;
pub mod observability_routes;
pub mod server;

pub use config::HttpServerConfig;
pub use data_routes::AppState;
pub use errors::{ApiError, ApiResult};
pub use server::HttpServer;
