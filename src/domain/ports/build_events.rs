//! Build Event Port
//!
//! Provides an observable interface for build passes.
//! Enables progress reporting, JSON event streams, and debugging.

use std::path::PathBuf;

/// Event emitted while the coordinator runs
#[derive(Debug, Clone, PartialEq)]
pub enum BuildEvent {
    /// Coordinator started
    Started { root: PathBuf, watch: bool },

    /// A watched path changed
    FileChanged { path: PathBuf },

    /// A pass took ownership of a fresh build context
    PassStarted { pass: u64, is_rebuild: bool },

    /// A declaration artifact was generated
    ArtifactGenerated {
        path: PathBuf,
        hash: String,
        changed: bool,
    },

    /// Staged changes were committed
    Committed {
        pass: u64,
        written: usize,
        deleted: usize,
        dirs_added: usize,
        dirs_deleted: usize,
        errors: usize,
    },

    /// A pass resolved
    PassFinished {
        pass: u64,
        components: usize,
        diagnostics: usize,
        has_error: bool,
        duration_ms: u64,
    },

    /// A snapshot arrived while a pass was running or after the result was taken
    Superseded { snapshot_version: u64 },

    /// Error occurred
    Error { message: String },

    /// Coordinator stopped
    Shutdown,
}

/// Trait for receiving build events
///
/// Implementations:
/// - `JsonEventSink`: NDJSON event stream for CI
/// - `ConsoleEventSink`: human-readable lines
/// - `NoopEventSink`: silent operation
pub trait BuildEventSink: Send + Sync {
    fn on_event(&self, event: BuildEvent);
}

/// No-op event sink for silent operation
pub struct NoopEventSink;

impl BuildEventSink for NoopEventSink {
    fn on_event(&self, _event: BuildEvent) {}
}
