//! Observable lifecycle and table events
//!
//! Events are explicit and typed; each has a stable uppercase name used as
//! the `event` field of the emitted log line.

use std::fmt;

/// Observable events in csvstore
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Lifecycle
    /// Process startup begins
    StartupBegin,
    /// Configuration loaded
    ConfigLoaded,
    /// HTTP listener bound, ready to serve
    ServerListening,
    /// Shutdown signal received
    ShutdownStart,
    /// Server stopped
    ShutdownComplete,

    // Table source
    /// CSV source read into the table
    TableLoaded,
    /// CSV source could not be read, table starts empty
    LoadFailed,
    /// Loaded rows that do not satisfy the declared schema
    SchemaDrift,

    // Mutations
    /// Record appended
    RecordInserted,
    /// Record fields overwritten
    RecordUpdated,
    /// Record removed
    RecordDeleted,
    /// Write rejected by validation
    RecordRejected,

    // Reads
    /// Full table exported
    TableExported,
}

impl Event {
    /// Returns the event name
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::StartupBegin => "STARTUP_BEGIN",
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::ServerListening => "SERVER_LISTENING",
            Event::ShutdownStart => "SHUTDOWN_START",
            Event::ShutdownComplete => "SHUTDOWN_COMPLETE",

            Event::TableLoaded => "TABLE_LOADED",
            Event::LoadFailed => "LOAD_FAILED",
            Event::SchemaDrift => "SCHEMA_DRIFT",

            Event::RecordInserted => "RECORD_INSERTED",
            Event::RecordUpdated => "RECORD_UPDATED",
            Event::RecordDeleted => "RECORD_DELETED",
            Event::RecordRejected => "RECORD_REJECTED",

            Event::TableExported => "TABLE_EXPORTED",
        }
    }

    /// Returns true if this event reports a failure
    pub fn is_failure(&self) -> bool {
        matches!(self, Event::LoadFailed)
    }

    /// Returns true if this event reports a degraded but working state
    pub fn is_warning(&self) -> bool {
        matches!(self, Event::SchemaDrift | Event::RecordRejected)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
