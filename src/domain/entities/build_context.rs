//! Build context entity
//!
//! One `BuildContext` exists per pass. It is created fresh by the build
//! coordinator, owned by that pass alone, and handed to the caller once the
//! pass resolves. Mutations are only accepted while the pass is building.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use super::component::ComponentDescriptor;
use super::diagnostic::Diagnostic;

/// Lifecycle of a single pass: `Idle -> Building -> {Resolved, Superseded}`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassPhase {
    Idle,
    Building,
    Resolved,
    Superseded,
}

impl PassPhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, PassPhase::Resolved | PassPhase::Superseded)
    }
}

/// State of one build pass
#[derive(Debug, Clone)]
pub struct BuildContext {
    /// Sequence number of this pass within its coordinator (starts at 1)
    pub pass: u64,
    /// Whether an earlier pass already ran on the same compilation unit
    pub is_rebuild: bool,
    pub requires_full_build: bool,
    phase: PassPhase,
    started_at: Option<Instant>,
    duration: Option<Duration>,
    diagnostics: Vec<Diagnostic>,
    /// Populated from the commit result
    pub files_written: Vec<PathBuf>,
    pub files_deleted: Vec<PathBuf>,
    pub dirs_added: Vec<PathBuf>,
    pub dirs_deleted: Vec<PathBuf>,
    pub components: Vec<ComponentDescriptor>,
    /// Whether the source-tree declaration artifact changed this pass
    pub components_dts_changed: bool,
}

impl BuildContext {
    /// A fresh context for a full, non-incremental build
    pub fn full_build(pass: u64) -> Self {
        Self {
            pass,
            is_rebuild: false,
            requires_full_build: true,
            phase: PassPhase::Idle,
            started_at: None,
            duration: None,
            diagnostics: Vec::new(),
            files_written: Vec::new(),
            files_deleted: Vec::new(),
            dirs_added: Vec::new(),
            dirs_deleted: Vec::new(),
            components: Vec::new(),
            components_dts_changed: false,
        }
    }

    /// A fresh context for a rebuild triggered after an earlier pass
    pub fn rebuild(pass: u64) -> Self {
        Self {
            is_rebuild: true,
            requires_full_build: false,
            ..Self::full_build(pass)
        }
    }

    /// `Idle -> Building`, stamping the monotonic start time
    pub fn start(&mut self) {
        if self.phase == PassPhase::Idle {
            self.phase = PassPhase::Building;
            self.started_at = Some(Instant::now());
        }
    }

    /// `Building -> Resolved`
    pub fn resolve(&mut self) {
        self.finish(PassPhase::Resolved);
    }

    /// `Building -> Superseded`
    pub fn supersede(&mut self) {
        self.finish(PassPhase::Superseded);
    }

    fn finish(&mut self, phase: PassPhase) {
        if self.phase == PassPhase::Building {
            self.phase = phase;
            self.duration = self.started_at.map(|t| t.elapsed());
        }
    }

    pub fn phase(&self) -> PassPhase {
        self.phase
    }

    /// Whether this context still accepts mutations
    pub fn is_active(&self) -> bool {
        self.phase == PassPhase::Building
    }

    pub fn started_at(&self) -> Option<Instant> {
        self.started_at
    }

    /// Wall time from `start` to resolution
    pub fn duration(&self) -> Option<Duration> {
        self.duration
    }

    /// Append a diagnostic. Diagnostics reaching a finished pass are logged
    /// instead, since nothing will read the context again.
    pub fn push_diagnostic(&mut self, diagnostic: Diagnostic) {
        if self.is_active() {
            self.diagnostics.push(diagnostic);
        } else {
            tracing::warn!(pass = self.pass, %diagnostic, "diagnostic after pass finished");
        }
    }

    pub fn extend_diagnostics(&mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        for diagnostic in diagnostics {
            self.push_diagnostic(diagnostic);
        }
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn has_error(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    /// Start a timed span; `finish` logs the elapsed time
    pub fn create_time_span(&self, label: impl Into<String>) -> TimeSpan {
        let label = label.into();
        tracing::debug!(pass = self.pass, "{}", label);
        TimeSpan {
            pass: self.pass,
            started: Instant::now(),
        }
    }
}

/// Timing handle returned by `BuildContext::create_time_span`
#[derive(Debug)]
pub struct TimeSpan {
    pass: u64,
    started: Instant,
}

impl TimeSpan {
    pub fn finish(self, message: impl AsRef<str>) -> Duration {
        let elapsed = self.started.elapsed();
        tracing::debug!(
            pass = self.pass,
            elapsed_ms = elapsed.as_millis() as u64,
            "{}",
            message.as_ref()
        );
        elapsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_build_flags() {
        let ctx = BuildContext::full_build(1);
        assert!(!ctx.is_rebuild);
        assert!(ctx.requires_full_build);
        assert_eq!(ctx.phase(), PassPhase::Idle);
    }

    #[test]
    fn rebuild_flags() {
        let ctx = BuildContext::rebuild(2);
        assert!(ctx.is_rebuild);
        assert!(!ctx.requires_full_build);
        assert_eq!(ctx.pass, 2);
    }

    #[test]
    fn lifecycle_is_one_way() {
        let mut ctx = BuildContext::full_build(1);
        ctx.start();
        assert!(ctx.is_active());
        assert!(ctx.started_at().is_some());

        ctx.resolve();
        assert_eq!(ctx.phase(), PassPhase::Resolved);
        assert!(ctx.duration().is_some());

        ctx.supersede();
        ctx.start();
        assert_eq!(ctx.phase(), PassPhase::Resolved);
    }

    #[test]
    fn diagnostics_only_accepted_while_building() {
        let mut ctx = BuildContext::full_build(1);
        ctx.push_diagnostic(Diagnostic::error("too early"));
        assert!(ctx.diagnostics().is_empty());

        ctx.start();
        ctx.push_diagnostic(Diagnostic::warning("first"));
        ctx.push_diagnostic(Diagnostic::error("second"));
        assert_eq!(ctx.diagnostics().len(), 2);
        assert_eq!(ctx.diagnostics()[0].message, "first");
        assert!(ctx.has_error());

        ctx.resolve();
        ctx.push_diagnostic(Diagnostic::error("too late"));
        assert_eq!(ctx.diagnostics().len(), 2);
    }

    #[test]
    fn start_times_increase() {
        let mut a = BuildContext::full_build(1);
        a.start();
        let mut b = BuildContext::rebuild(2);
        b.start();
        assert!(b.started_at().unwrap() >= a.started_at().unwrap());
    }
}
