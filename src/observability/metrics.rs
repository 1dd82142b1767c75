//! Operation counters
//!
//! - Counters only, monotonic
//! - Reset only on process start
//! - Thread-safe, lock-free

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Registry of table operation counters.
///
/// Uses Relaxed ordering; counters are independent of each other.
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    /// Paginated reads served
    reads: AtomicU64,
    /// Records appended
    inserts: AtomicU64,
    /// Records updated
    updates: AtomicU64,
    /// Records deleted
    deletes: AtomicU64,
    /// Full exports served
    exports: AtomicU64,
    /// Writes rejected for invalid input
    rejections: AtomicU64,
    /// Lookups that addressed a missing row
    not_found: AtomicU64,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_reads(&self) {
        self.reads.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_inserts(&self) {
        self.inserts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_updates(&self) {
        self.updates.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_deletes(&self) {
        self.deletes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_exports(&self) {
        self.exports.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_rejections(&self) {
        self.rejections.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_not_found(&self) {
        self.not_found.fetch_add(1, Ordering::Relaxed);
    }

    /// Get all counters as a snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            reads: self.reads.load(Ordering::Relaxed),
            inserts: self.inserts.load(Ordering::Relaxed),
            updates: self.updates.load(Ordering::Relaxed),
            deletes: self.deletes.load(Ordering::Relaxed),
            exports: self.exports.load(Ordering::Relaxed),
            rejections: self.rejections.load(Ordering::Relaxed),
            not_found: self.not_found.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of all counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub reads: u64,
    pub inserts: u64,
    pub updates: u64,
    pub deletes: u64,
    pub exports: u64,
    pub rejections: u64,
    pub not_found: u64,
}
