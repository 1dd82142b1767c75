//! Data HTTP Routes
//!
//! Endpoints for paginated reads, insert/update/delete and export of the
//! table. Rows are addressed by position under `/data` and by stable key
//! under `/rows`.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use super::errors::{ApiError, ApiResult};
use crate::observability::{log_event_with_fields, Event, MetricsRegistry};
use crate::schema::TableSchema;
use crate::table::{Page, Record, Row, RowKey, TableStore};

// ==================
// Shared State
// ==================

/// State shared across data handlers
pub struct AppState {
    pub store: Arc<TableStore>,
    pub metrics: Arc<MetricsRegistry>,
    /// Page size used when `per_page` is missing or malformed
    pub default_per_page: i64,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(store: Arc<TableStore>) -> Self {
        Self {
            store,
            metrics: Arc::new(MetricsRegistry::new()),
            default_per_page: DEFAULT_PER_PAGE,
            started_at: Utc::now(),
        }
    }

    pub fn with_default_per_page(mut self, per_page: i64) -> Self {
        self.default_per_page = per_page;
        self
    }

    /// Counts and logs a failed request
    fn observe_failure(&self, operation: &str, err: &ApiError) {
        match err {
            ApiError::NotFound => self.metrics.increment_not_found(),
            ApiError::InvalidData | ApiError::Schema(_) => {
                self.metrics.increment_rejections();
                log_event_with_fields(
                    Event::RecordRejected,
                    &[("operation", operation), ("reason", err.to_string().as_str())],
                );
            }
            ApiError::Internal(_) => {}
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Arc::new(TableStore::default()))
    }
}

const DEFAULT_PAGE: i64 = 1;
const DEFAULT_PER_PAGE: i64 = 25;

// ==================
// Request/Response Types
// ==================

/// Pagination query; values are kept as text so malformed input falls back
/// to defaults instead of rejecting the request.
#[derive(Debug, Default)]
pub struct PageQuery {
    pub page: Option<String>,
    pub per_page: Option<String>,
}

impl PageQuery {
    /// Builds the query from raw pairs. A repeated parameter keeps its first
    /// value; unrelated parameters are ignored.
    pub fn from_pairs(pairs: &[(String, String)]) -> Self {
        let first = |name: &str| {
            pairs
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.clone())
        };
        Self {
            page: first("page"),
            per_page: first("per_page"),
        }
    }

    /// Resolves `(page, per_page)`, defaulting missing or malformed values
    pub fn resolve(&self, default_per_page: i64) -> (i64, i64) {
        (
            parse_or(self.page.as_deref(), DEFAULT_PAGE),
            parse_or(self.per_page.as_deref(), default_per_page),
        )
    }
}

fn parse_or(raw: Option<&str>, default: i64) -> i64 {
    raw.and_then(|s| s.trim().parse().ok()).unwrap_or(default)
}

#[derive(Debug, Serialize)]
pub struct RecordResponse {
    pub message: String,
    pub data: Record,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<RowKey>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ColumnsResponse {
    pub columns: Vec<String>,
    pub schema: Option<TableSchema>,
}

// ==================
// Data Routes
// ==================

/// Create data routes
pub fn data_routes(state: Arc<AppState>) -> Router {
    Router::new()
        // Positional addressing
        .route("/data", get(list_handler).post(create_handler))
        .route(
            "/data/:row_id",
            get(get_handler).put(update_handler).delete(delete_handler),
        )
        .route("/export", get(export_handler))
        // Stable key addressing
        .route("/rows", get(list_rows_handler).post(create_handler))
        .route(
            "/rows/:key",
            get(get_by_key_handler)
                .put(update_by_key_handler)
                .delete(delete_by_key_handler),
        )
        .route("/columns", get(columns_handler))
        .with_state(state)
}

// ==================
// Helper Functions
// ==================

/// Parses a path segment as a non-negative integer; anything else addresses
/// no row.
fn parse_index(raw: &str) -> ApiResult<usize> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ApiError::NotFound);
    }
    raw.parse().map_err(|_| ApiError::NotFound)
}

fn parse_key(raw: &str) -> ApiResult<RowKey> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ApiError::NotFound);
    }
    raw.parse().map_err(|_| ApiError::NotFound)
}

/// Parses a body that must be a JSON object
fn parse_object(body: &[u8]) -> ApiResult<Record> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(ApiError::InvalidData);
    }
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        _ => Err(ApiError::InvalidData),
    }
}

/// Parses an insert body: a non-empty JSON object
fn parse_new_record(body: &[u8]) -> ApiResult<Record> {
    let record = parse_object(body)?;
    if record.is_empty() {
        return Err(ApiError::InvalidData);
    }
    Ok(record)
}

// ==================
// Read Handlers
// ==================

async fn list_handler(
    State(state): State<Arc<AppState>>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Json<Page<Record>> {
    let (page, per_page) = PageQuery::from_pairs(&pairs).resolve(state.default_per_page);
    state.metrics.increment_reads();
    Json(state.store.page(page, per_page))
}

async fn list_rows_handler(
    State(state): State<Arc<AppState>>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Json<Page<Row>> {
    let (page, per_page) = PageQuery::from_pairs(&pairs).resolve(state.default_per_page);
    state.metrics.increment_reads();
    Json(state.store.page_rows(page, per_page))
}

async fn get_handler(
    State(state): State<Arc<AppState>>,
    Path(row_id): Path<String>,
) -> ApiResult<Json<Record>> {
    let result = parse_index(&row_id).and_then(|index| Ok(state.store.get(index)?));
    result.map(Json).map_err(|e| {
        state.observe_failure("get", &e);
        e
    })
}

async fn get_by_key_handler(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> ApiResult<Json<Record>> {
    let result = parse_key(&key).and_then(|key| Ok(state.store.get_by_key(key)?));
    result.map(Json).map_err(|e| {
        state.observe_failure("get", &e);
        e
    })
}

async fn export_handler(State(state): State<Arc<AppState>>) -> Json<Vec<Record>> {
    let records = state.store.export();
    state.metrics.increment_exports();
    log_event_with_fields(Event::TableExported, &[("rows", records.len().to_string().as_str())]);
    Json(records)
}

async fn columns_handler(State(state): State<Arc<AppState>>) -> Json<ColumnsResponse> {
    Json(ColumnsResponse {
        columns: state.store.columns(),
        schema: state.store.schema().cloned(),
    })
}

// ==================
// Write Handlers
// ==================

async fn create_handler(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<RecordResponse>)> {
    let result = parse_new_record(&body).and_then(|record| Ok(state.store.insert(record)?));

    match result {
        Ok((key, record)) => {
            state.metrics.increment_inserts();
            log_event_with_fields(Event::RecordInserted, &[("key", key.to_string().as_str())]);
            Ok((
                StatusCode::CREATED,
                Json(RecordResponse {
                    message: "Record added successfully".to_string(),
                    data: record,
                    key: Some(key),
                }),
            ))
        }
        Err(e) => {
            state.observe_failure("insert", &e);
            Err(e)
        }
    }
}

async fn update_handler(
    State(state): State<Arc<AppState>>,
    Path(row_id): Path<String>,
    body: Bytes,
) -> ApiResult<Json<RecordResponse>> {
    let result = parse_index(&row_id).and_then(|index| {
        let partial = parse_object(&body)?;
        Ok(state.store.update(index, &partial)?)
    });
    finish_update(&state, &row_id, result)
}

async fn update_by_key_handler(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
    body: Bytes,
) -> ApiResult<Json<RecordResponse>> {
    let result = parse_key(&key).and_then(|row_key| {
        let partial = parse_object(&body)?;
        Ok(state.store.update_by_key(row_key, &partial)?)
    });
    finish_update(&state, &key, result)
}

fn finish_update(
    state: &AppState,
    target: &str,
    result: ApiResult<Record>,
) -> ApiResult<Json<RecordResponse>> {
    match result {
        Ok(record) => {
            state.metrics.increment_updates();
            log_event_with_fields(Event::RecordUpdated, &[("target", target)]);
            Ok(Json(RecordResponse {
                message: "Record updated successfully".to_string(),
                data: record,
                key: None,
            }))
        }
        Err(e) => {
            state.observe_failure("update", &e);
            Err(e)
        }
    }
}

async fn delete_handler(
    State(state): State<Arc<AppState>>,
    Path(row_id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    let result = parse_index(&row_id).and_then(|index| Ok(state.store.delete(index)?));
    finish_delete(&state, result)
}

async fn delete_by_key_handler(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    let result = parse_key(&key).and_then(|key| Ok(state.store.delete_by_key(key)?));
    finish_delete(&state, result)
}

fn finish_delete(state: &AppState, result: ApiResult<Row>) -> ApiResult<Json<MessageResponse>> {
    match result {
        Ok(row) => {
            state.metrics.increment_deletes();
            log_event_with_fields(Event::RecordDeleted, &[("key", row.key.to_string().as_str())]);
            Ok(Json(MessageResponse {
                message: "Record deleted successfully".to_string(),
            }))
        }
        Err(e) => {
            state.observe_failure("delete", &e);
            Err(e)
        }
    }
}
