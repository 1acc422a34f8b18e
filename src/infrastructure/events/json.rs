//! JSON Event Sink
//!
//! Outputs build events as NDJSON for CI/automation consumption.

use crate::domain::ports::{BuildEvent, BuildEventSink};
use std::io::{self, Write};
use std::sync::Mutex;

/// Event sink that outputs NDJSON events to stdout
pub struct JsonEventSink {
    /// Mutex to ensure thread-safe writes
    writer: Mutex<Box<dyn Write + Send>>,
    command: &'static str,
}

impl JsonEventSink {
    /// Create a new JSON event sink writing to stdout
    pub fn stdout(command: &'static str) -> Self {
        Self::with_writer(command, io::stdout())
    }

    /// Create a JSON event sink writing to a custom writer
    pub fn with_writer<W: Write + Send + 'static>(command: &'static str, writer: W) -> Self {
        Self {
            writer: Mutex::new(Box::new(writer)),
            command,
        }
    }

    fn write_event(&self, event: serde_json::Value) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{}", event);
            let _ = writer.flush();
        }
    }

    fn to_json(&self, event: BuildEvent) -> serde_json::Value {
        let command = self.command;
        match event {
            BuildEvent::Started { root, watch } => serde_json::json!({
                "event": "start",
                "command": command,
                "root": root.display().to_string(),
                "watch": watch,
            }),

            BuildEvent::FileChanged { path } => serde_json::json!({
                "event": "file_changed",
                "command": command,
                "path": path.display().to_string(),
            }),

            BuildEvent::PassStarted { pass, is_rebuild } => serde_json::json!({
                "event": "pass_start",
                "command": command,
                "pass": pass,
                "rebuild": is_rebuild,
            }),

            BuildEvent::ArtifactGenerated {
                path,
                hash,
                changed,
            } => serde_json::json!({
                "event": "artifact",
                "command": command,
                "path": path.display().to_string(),
                "hash": hash,
                "changed": changed,
            }),

            BuildEvent::Committed {
                pass,
                written,
                deleted,
                dirs_added,
                dirs_deleted,
                errors,
            } => serde_json::json!({
                "event": "committed",
                "command": command,
                "pass": pass,
                "written": written,
                "deleted": deleted,
                "dirs_added": dirs_added,
                "dirs_deleted": dirs_deleted,
                "errors": errors,
            }),

            BuildEvent::PassFinished {
                pass,
                components,
                diagnostics,
                has_error,
                duration_ms,
            } => {
                let status = if has_error { "failed" } else { "success" };
                serde_json::json!({
                    "event": "pass_complete",
                    "command": command,
                    "status": status,
                    "pass": pass,
                    "components": components,
                    "diagnostics": diagnostics,
                    "duration_ms": duration_ms,
                })
            }

            BuildEvent::Superseded { snapshot_version } => serde_json::json!({
                "event": "superseded",
                "command": command,
                "snapshot_version": snapshot_version,
            }),

            BuildEvent::Error { message } => serde_json::json!({
                "event": "error",
                "command": command,
                "message": message,
            }),

            BuildEvent::Shutdown => serde_json::json!({
                "event": "shutdown",
                "command": command,
            }),
        }
    }
}

impl BuildEventSink for JsonEventSink {
    fn on_event(&self, event: BuildEvent) {
        let json = self.to_json(event);
        self.write_event(json);
    }
}
