//! Observability for csvstore
//!
//! - Typed lifecycle events, emitted through `tracing`
//! - Lock-free operation counters
//!
//! # Usage
//!
//! ```ignore
//! use csvstore::observability::{log_event_with_fields, Event, MetricsRegistry};
//!
//! log_event_with_fields(Event::TableLoaded, &[("rows", "42")]);
//!
//! let metrics = MetricsRegistry::new();
//! metrics.increment_inserts();
//! ```

mod events;
mod metrics;

pub use events::Event;
pub use metrics::{MetricsRegistry, MetricsSnapshot};

/// Log a lifecycle event
pub fn log_event(event: Event) {
    log_event_with_fields(event, &[]);
}

/// Log a lifecycle event with fields.
///
/// Fields are rendered in the order given as `key=value` pairs.
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    let rendered = render_fields(fields);
    if event.is_failure() {
        tracing::error!(event = event.as_str(), "{}", rendered);
    } else if event.is_warning() {
        tracing::warn!(event = event.as_str(), "{}", rendered);
    } else {
        tracing::info!(event = event.as_str(), "{}", rendered);
    }
}

fn render_fields(fields: &[(&str, &str)]) -> String {
    fields
        .iter()
        .map(|(key, value)| format!("{}={}", key, value))
        .collect::<Vec<_>>()
        .join(" ")
}
