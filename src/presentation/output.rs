//! Output Rendering
//!
//! Human-readable rendering of build events and pass summaries. NDJSON
//! output lives in `infrastructure::events::JsonEventSink`.

use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

use crate::domain::entities::BuildContext;
use crate::domain::ports::{BuildEvent, BuildEventSink};

/// Icons for output rendering
#[derive(Debug, Clone, Copy)]
pub struct Icons {
    check: &'static str,
    cross: &'static str,
    write: &'static str,
    trash: &'static str,
    change: &'static str,
}

impl Icons {
    pub fn unicode() -> Self {
        Self {
            check: "✓",
            cross: "✗",
            write: "→",
            trash: "🗑",
            change: "●",
        }
    }

    pub fn ascii() -> Self {
        Self {
            check: "[OK]",
            cross: "[FAIL]",
            write: "->",
            trash: "[DEL]",
            change: "*",
        }
    }

    /// Unicode unless the terminal is known not to handle it
    pub fn detect() -> Self {
        match std::env::var("TERM") {
            Ok(term) if term == "dumb" => Self::ascii(),
            _ => Self::unicode(),
        }
    }
}

/// Render one event as a console line, or `None` when it stays quiet at
/// this verbosity
pub fn render_event(event: &BuildEvent, icons: &Icons, verbose: u8) -> Option<String> {
    match event {
        BuildEvent::Started { root, watch: true } => {
            Some(format!("Watching {} (Ctrl+C to stop)", root.display()))
        }
        BuildEvent::Started { .. } => None,
        BuildEvent::FileChanged { path } if verbose > 0 => {
            Some(format!("{} {}", icons.change, path.display()))
        }
        BuildEvent::PassStarted {
            pass,
            is_rebuild: true,
        } => Some(format!("{} rebuild #{}", icons.change, pass)),
        BuildEvent::ArtifactGenerated {
            path,
            hash,
            changed,
        } if verbose > 1 => Some(format!(
            "  {} {} ({}{})",
            icons.write,
            path.display(),
            hash,
            if *changed { ", changed" } else { "" }
        )),
        BuildEvent::Committed {
            written,
            deleted,
            errors,
            ..
        } if verbose > 0 => Some(format!(
            "  committed: {} written, {} deleted, {} failed",
            written, deleted, errors
        )),
        BuildEvent::PassFinished {
            pass,
            components,
            diagnostics,
            has_error,
            duration_ms,
        } => {
            let icon = if *has_error { icons.cross } else { icons.check };
            Some(format!(
                "{} pass #{}: {} components, {} diagnostics in {} ms",
                icon, pass, components, diagnostics, duration_ms
            ))
        }
        BuildEvent::Superseded { snapshot_version } if verbose > 0 => {
            Some(format!("  snapshot {} superseded", snapshot_version))
        }
        BuildEvent::Error { message } => Some(format!("{} {}", icons.cross, message)),
        _ => None,
    }
}

/// Prints events as human-readable lines
///
/// Errors go to stderr, everything else to the given writer.
pub struct ConsoleEventSink {
    out: Mutex<Box<dyn Write + Send>>,
    icons: Icons,
    verbose: u8,
}

impl ConsoleEventSink {
    pub fn stdout(verbose: u8) -> Self {
        Self::with_writer(std::io::stdout(), Icons::detect(), verbose)
    }

    pub fn with_writer<W: Write + Send + 'static>(writer: W, icons: Icons, verbose: u8) -> Self {
        Self {
            out: Mutex::new(Box::new(writer)),
            icons,
            verbose,
        }
    }
}

impl BuildEventSink for ConsoleEventSink {
    fn on_event(&self, event: BuildEvent) {
        let Some(line) = render_event(&event, &self.icons, self.verbose) else {
            return;
        };
        if matches!(event, BuildEvent::Error { .. }) {
            eprintln!("{}", line);
            return;
        }
        let mut out = self.out.lock().unwrap_or_else(|e| e.into_inner());
        let _ = writeln!(out, "{}", line);
        let _ = out.flush();
    }
}

/// Text summary of a finished full build
pub fn render_build_summary(ctx: &BuildContext, root: &Path, icons: &Icons) -> String {
    let mut lines = Vec::new();
    let ms = ctx.duration().map(|d| d.as_millis()).unwrap_or(0);

    if ctx.has_error() {
        lines.push(format!("{} Build Failed", icons.cross));
    } else {
        lines.push(format!("{} Build Complete", icons.check));
    }
    lines.push(String::new());
    lines.push(format!("  Root: {}", root.display()));
    lines.push(format!("  {} components in {} ms", ctx.components.len(), ms));

    if ctx.files_written.is_empty() && ctx.files_deleted.is_empty() {
        lines.push("  Already up-to-date".to_string());
    }
    if !ctx.files_written.is_empty() {
        lines.push(format!("  Written ({}):", ctx.files_written.len()));
        for path in &ctx.files_written {
            lines.push(format!("    {} {}", icons.write, display_relative(path, root)));
        }
    }
    if !ctx.files_deleted.is_empty() {
        lines.push(format!("  Deleted ({}):", ctx.files_deleted.len()));
        for path in &ctx.files_deleted {
            lines.push(format!("    {} {}", icons.trash, display_relative(path, root)));
        }
    }

    if !ctx.diagnostics().is_empty() {
        lines.push(String::new());
        lines.push(format!("  Diagnostics ({}):", ctx.diagnostics().len()));
        for diagnostic in ctx.diagnostics() {
            lines.push(format!("    {}", diagnostic));
        }
    }

    lines.join("\n") + "\n"
}

/// JSON summary of a finished full build
pub fn build_summary_json(ctx: &BuildContext) -> serde_json::Value {
    let paths = |list: &[std::path::PathBuf]| -> Vec<String> {
        list.iter().map(|p| p.display().to_string()).collect()
    };
    serde_json::json!({
        "event": "summary",
        "command": "build",
        "success": !ctx.has_error(),
        "pass": ctx.pass,
        "components": ctx.components.len(),
        "components_dts_changed": ctx.components_dts_changed,
        "written": paths(&ctx.files_written),
        "deleted": paths(&ctx.files_deleted),
        "dirs_added": paths(&ctx.dirs_added),
        "dirs_deleted": paths(&ctx.dirs_deleted),
        "diagnostics": ctx.diagnostics(),
        "duration_ms": ctx.duration().map(|d| d.as_millis() as u64).unwrap_or(0),
    })
}

fn display_relative(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}
