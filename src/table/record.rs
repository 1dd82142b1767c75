//! Row and page types

use serde::Serialize;
use serde_json::{Map, Value};

/// A single row: column name to scalar value, in column order.
pub type Record = Map<String, Value>;

/// Stable per-process row identifier.
///
/// Assigned at load/insert time, never reused, unaffected by deletes.
pub type RowKey = u64;

/// A stored row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Row {
    pub key: RowKey,
    pub record: Record,
}

/// One page of records plus the full row count
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub total_records: usize,
}

/// Computes the `[start, end)` row range of a 1-based page, clamped to `len`.
///
/// Page 0, negative pages and non-positive page sizes yield an empty range.
pub fn page_bounds(len: usize, page: i64, per_page: i64) -> (usize, usize) {
    let start = page.saturating_sub(1).saturating_mul(per_page);
    let end = start.saturating_add(per_page);

    let clamp = |n: i64| -> usize {
        if n <= 0 {
            0
        } else {
            usize::try_from(n).map_or(len, |n| n.min(len))
        }
    };

    let (start, end) = (clamp(start), clamp(end));
    if start >= end {
        (start.min(len), start.min(len))
    } else {
        (start, end)
    }
}
