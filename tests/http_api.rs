//! HTTP API Tests
//!
//! Drives the router in-process:
//! - Pagination defaults, bounds and total count
//! - Insert / update / delete by position, including index compaction
//! - Export ordering
//! - Stable key addressing
//! - Schema enforcement at the HTTP boundary

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use csvstore::http_server::HttpServer;
use csvstore::schema::{ColumnDef, ColumnType, TableSchema};
use csvstore::table::{CsvLoader, Table, TableStore};

// =============================================================================
// Helper Functions
// =============================================================================

fn csv_with_rows(n: usize) -> String {
    let mut csv = String::from("ID,pregunta,respuesta\n");
    for i in 0..n {
        csv.push_str(&format!("{},question {},{}\n", i, i, i * 10));
    }
    csv
}

fn router_for(table: Table) -> Router {
    HttpServer::new(Arc::new(TableStore::new(table))).router()
}

fn router_with_rows(n: usize) -> Router {
    router_for(CsvLoader::new().parse_str(&csv_with_rows(n)).unwrap())
}

async fn send(router: &Router, method: Method, uri: &str, body: Option<&str>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(body.map_or_else(Body::empty, |b| Body::from(b.to_string())))
        .unwrap();

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn get(router: &Router, uri: &str) -> (StatusCode, Value) {
    send(router, Method::GET, uri, None).await
}

// =============================================================================
// Pagination Tests
// =============================================================================

/// A table of N rows reports total_records == N on the first page.
#[tokio::test]
async fn test_total_records_matches_loaded_rows() {
    let router = router_with_rows(7);
    let (status, body) = get(&router, "/data").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_records"], 7);
    assert_eq!(body["data"].as_array().unwrap().len(), 7);
}

/// 30 rows split into 25 + 5 with the default page size.
#[tokio::test]
async fn test_pages_split_thirty_rows() {
    let router = router_with_rows(30);

    let (_, first) = get(&router, "/data?page=1&per_page=25").await;
    assert_eq!(first["data"].as_array().unwrap().len(), 25);
    assert_eq!(first["data"][0]["ID"], 0);

    let (_, second) = get(&router, "/data?page=2&per_page=25").await;
    let data = second["data"].as_array().unwrap();
    assert_eq!(data.len(), 5);
    assert_eq!(data[0]["ID"], 25);
    assert_eq!(second["total_records"], 30);
}

/// A page past the end is empty but keeps the total.
#[tokio::test]
async fn test_page_beyond_end_is_empty() {
    let router = router_with_rows(30);
    let (status, body) = get(&router, "/data?page=9").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["data"].as_array().unwrap().is_empty());
    assert_eq!(body["total_records"], 30);
}

/// Malformed pagination parameters fall back to defaults.
#[tokio::test]
async fn test_malformed_pagination_uses_defaults() {
    let router = router_with_rows(30);
    let (status, body) = get(&router, "/data?page=abc&per_page=xyz").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 25);
    assert_eq!(body["data"][0]["ID"], 0);
}

/// A repeated or valueless pagination parameter is not a request error.
#[tokio::test]
async fn test_repeated_pagination_parameter_keeps_first() {
    let router = router_with_rows(30);

    let (status, body) = get(&router, "/data?page=2&page=1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 5);
    assert_eq!(body["data"][0]["ID"], 25);

    let (status, body) = get(&router, "/data?page=1&page").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["ID"], 0);

    let (status, body) = get(&router, "/data?page&per_page=10&per_page=3").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 10);

    let (status, body) = get(&router, "/rows?per_page=4&per_page=x").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 4);
}

/// A missing CSV source serves an empty table without failing.
#[tokio::test]
async fn test_missing_source_serves_empty_table() {
    let table = CsvLoader::new().load(std::path::Path::new("/no/such/source.csv"));
    let router = router_for(table);

    let (status, body) = get(&router, "/data").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_records"], 0);
    assert_eq!(body["data"], json!([]));
}

// =============================================================================
// Insert Tests
// =============================================================================

/// A posted record is the last exported record.
#[tokio::test]
async fn test_post_then_export() {
    let router = router_for(Table::new());

    let (status, body) = send(&router, Method::POST, "/data", Some(r#"{"name": "x"}"#)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Record added successfully");
    assert_eq!(body["data"], json!({"name": "x"}));

    let (_, exported) = get(&router, "/export").await;
    let records = exported.as_array().unwrap();
    assert_eq!(records.last().unwrap(), &json!({"name": "x"}));
}

/// Posting onto a loaded table appends after the existing rows.
#[tokio::test]
async fn test_post_appends_after_loaded_rows() {
    let router = router_with_rows(3);
    send(&router, Method::POST, "/data", Some(r#"{"pregunta": "new"}"#)).await;

    let (_, exported) = get(&router, "/export").await;
    let records = exported.as_array().unwrap();
    assert_eq!(records.len(), 4);
    assert_eq!(records[3], json!({"pregunta": "new"}));
}

/// Empty or non-object bodies are rejected with 400.
#[tokio::test]
async fn test_post_invalid_body() {
    let router = router_with_rows(2);

    for body in [None, Some(""), Some("{}"), Some("null"), Some("[1]"), Some("{bad")] {
        let (status, response) = send(&router, Method::POST, "/data", body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body {:?}", body);
        assert_eq!(response["error"], "Invalid data");
    }

    let (_, listed) = get(&router, "/data").await;
    assert_eq!(listed["total_records"], 2);
}

// =============================================================================
// Update Tests
// =============================================================================

/// A partial update changes only the supplied fields.
#[tokio::test]
async fn test_put_changes_only_supplied_fields() {
    let router = router_with_rows(3);

    let (status, body) = send(
        &router,
        Method::PUT,
        "/data/1",
        Some(r#"{"respuesta": 99, "unknown": "ignored"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Record updated successfully");
    assert_eq!(
        body["data"],
        json!({"ID": 1, "pregunta": "question 1", "respuesta": 99})
    );

    let (_, exported) = get(&router, "/export").await;
    assert_eq!(exported[0]["respuesta"], 0);
    assert_eq!(exported[2]["respuesta"], 20);
}

/// Updating row_id == total_records is not found and changes nothing.
#[tokio::test]
async fn test_put_out_of_range() {
    let router = router_with_rows(3);
    let (_, before) = get(&router, "/export").await;

    let (status, body) = send(&router, Method::PUT, "/data/3", Some(r#"{"respuesta": 1}"#)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Record not found");

    let (_, after) = get(&router, "/export").await;
    assert_eq!(before, after);
}

/// A non-integer row id addresses no row.
#[tokio::test]
async fn test_put_non_integer_row_id() {
    let router = router_with_rows(3);
    let (status, _) = send(&router, Method::PUT, "/data/-1", Some(r#"{"ID": 5}"#)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&router, Method::PUT, "/data/first", Some(r#"{"ID": 5}"#)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

/// A non-object update body is a client error, not a crash.
#[tokio::test]
async fn test_put_non_object_body() {
    let router = router_with_rows(3);
    let (status, _) = send(&router, Method::PUT, "/data/0", Some("[1, 2]")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// =============================================================================
// Delete Tests
// =============================================================================

/// Deleting row 0 of 3 compacts: former row 1 becomes row 0.
#[tokio::test]
async fn test_delete_compacts_indices() {
    let router = router_with_rows(3);

    let (status, body) = send(&router, Method::DELETE, "/data/0", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Record deleted successfully");

    let (_, listed) = get(&router, "/data").await;
    assert_eq!(listed["total_records"], 2);
    assert_eq!(listed["data"][0]["ID"], 1);

    let (_, row) = get(&router, "/data/0").await;
    assert_eq!(row["pregunta"], "question 1");
}

/// Deleting the last index twice: the second one is not found.
#[tokio::test]
async fn test_repeat_delete_is_not_found() {
    let router = router_with_rows(3);

    let (status, _) = send(&router, Method::DELETE, "/data/2", None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&router, Method::DELETE, "/data/2", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Record not found");
}

// =============================================================================
// Stable Key Tests
// =============================================================================

/// Keys keep addressing the same record after earlier rows are deleted.
#[tokio::test]
async fn test_keys_survive_delete() {
    let router = router_with_rows(3);

    send(&router, Method::DELETE, "/data/0", None).await;

    let (status, row) = get(&router, "/rows/2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(row["ID"], 2);

    let (status, _) = get(&router, "/rows/0").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(&router, Method::PUT, "/rows/2", Some(r#"{"respuesta": 5}"#)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["respuesta"], 5);

    let (_, positional) = get(&router, "/data/1").await;
    assert_eq!(positional["respuesta"], 5);
}

/// Keyed listing pairs each record with its key; inserts report their key.
#[tokio::test]
async fn test_keyed_listing_and_insert_key() {
    let router = router_with_rows(2);

    let (_, created) = send(&router, Method::POST, "/data", Some(r#"{"ID": 9}"#)).await;
    assert_eq!(created["key"], 2);

    let (_, listed) = get(&router, "/rows?page=1&per_page=2").await;
    assert_eq!(listed["total_records"], 3);
    assert_eq!(listed["data"][1]["key"], 1);
    assert_eq!(listed["data"][1]["record"]["ID"], 1);

    let (status, _) = send(&router, Method::DELETE, "/rows/2", None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&router, Method::DELETE, "/rows/2", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// =============================================================================
// Schema Tests
// =============================================================================

fn schema_router() -> Router {
    let schema = TableSchema::new()
        .with_column("pregunta", ColumnDef::required(ColumnType::String))
        .with_column("respuesta", ColumnDef::nullable(ColumnType::Int));
    let store = TableStore::with_schema(Table::new(), schema);
    HttpServer::new(Arc::new(store)).router()
}

/// Undeclared or mistyped fields are rejected and the table is unchanged.
#[tokio::test]
async fn test_schema_rejections() {
    let router = schema_router();

    let (status, body) = send(
        &router,
        Method::POST,
        "/data",
        Some(r#"{"pregunta": "q", "extra": 1}"#),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("extra"));

    let (status, _) = send(
        &router,
        Method::POST,
        "/data",
        Some(r#"{"pregunta": "q", "respuesta": "ten"}"#),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, listed) = get(&router, "/data").await;
    assert_eq!(listed["total_records"], 0);

    let (status, _) = send(
        &router,
        Method::POST,
        "/data",
        Some(r#"{"pregunta": "q", "respuesta": 10}"#),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = send(&router, Method::PUT, "/data/0", Some(r#"{"respuesta": 1.5}"#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

/// An out-of-range row is not found even when the body would fail validation.
#[tokio::test]
async fn test_missing_row_wins_over_schema_error() {
    let router = schema_router();

    let (status, body) = send(&router, Method::PUT, "/data/0", Some(r#"{"bogus": 1}"#)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Record not found");

    let (status, _) = send(&router, Method::PUT, "/rows/0", Some(r#"{"respuesta": "x"}"#)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    send(&router, Method::POST, "/data", Some(r#"{"pregunta": "q"}"#)).await;
    let (status, _) = send(&router, Method::PUT, "/data/0", Some(r#"{"bogus": 1}"#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

/// Repeated header names become distinct columns.
#[tokio::test]
async fn test_duplicate_headers_keep_every_cell() {
    let router = router_for(CsvLoader::new().parse_str("a,a\n1,2\n").unwrap());

    let (_, columns) = get(&router, "/columns").await;
    assert_eq!(columns["columns"], json!(["a", "a.1"]));

    let (_, row) = get(&router, "/data/0").await;
    assert_eq!(row, json!({"a": 1, "a.1": 2}));
}

/// The column endpoint reports the declared schema.
#[tokio::test]
async fn test_columns_endpoint() {
    let router = schema_router();
    let (status, body) = get(&router, "/columns").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["columns"], json!(["pregunta", "respuesta"]));
    assert_eq!(body["schema"]["respuesta"]["type"], "int");

    let plain = router_with_rows(1);
    let (_, body) = get(&plain, "/columns").await;
    assert_eq!(body["columns"], json!(["ID", "pregunta", "respuesta"]));
    assert_eq!(body["schema"], Value::Null);
}

// =============================================================================
// Observability Tests
// =============================================================================

/// Health reports the live row count; metrics count operations.
#[tokio::test]
async fn test_health_and_metrics() {
    let router = router_with_rows(4);

    send(&router, Method::DELETE, "/data/0", None).await;
    send(&router, Method::DELETE, "/data/99", None).await;
    send(&router, Method::POST, "/data", Some("{}")).await;

    let (status, health) = get(&router, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(health["status"], "ok");
    assert_eq!(health["total_records"], 3);

    let (_, metrics) = get(&router, "/metrics").await;
    assert_eq!(metrics["deletes"], 1);
    assert_eq!(metrics["not_found"], 1);
    assert_eq!(metrics["rejections"], 1);
}
