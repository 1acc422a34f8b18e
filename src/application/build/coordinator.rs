//! Build coordinator
//!
//! Owns the compilation unit, the debouncer and the pass guard for one build
//! session. Every consistent snapshot the unit reports either starts a pass
//! with a fresh `BuildContext` or, when a pass is running or the session is
//! finished, is reported as superseded.
//!
//! A full build resolves with its first pass: notifiers are closed and the
//! guard terminated before the result is delivered, so a late notification
//! cannot reanimate the session. Watch mode keeps going until stopped.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};
use std::thread;
use std::time::Duration;

use crate::application::scheduler::{
    DebounceHandle, Debouncer, FaultHandler, PassGuard, PassState, Trigger,
};
use crate::config::Config;
use crate::domain::entities::BuildContext;
use crate::domain::ports::{
    BuildEvent, BuildEventSink, ChangeCallback, ChangeNotifier, CompilationUnit, CompilerOptions,
    FileSystem, Frontend, FrontendRequest, NoopEventSink, NotifierFactory, Snapshot,
    SnapshotCallback,
};
use crate::domain::value_objects::normalize_path;
use crate::error::{HobbesError, HobbesResult};
use crate::infrastructure::vfs::VirtualFs;

use super::completion::{self, Completer, Pending};
use super::pass::{self, PassEnv};

const WATCH_POLL: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Full,
    Watch,
}

pub struct BuildCoordinator {
    config: Config,
    frontend: Arc<dyn Frontend>,
    storage: Arc<dyn FileSystem>,
    notifiers: NotifierFactory,
    events: Arc<dyn BuildEventSink>,
}

impl BuildCoordinator {
    pub fn new(
        config: Config,
        frontend: Arc<dyn Frontend>,
        storage: Arc<dyn FileSystem>,
        notifiers: NotifierFactory,
    ) -> Self {
        Self {
            config,
            frontend,
            storage,
            notifiers,
            events: Arc::new(NoopEventSink),
        }
    }

    pub fn with_event_sink(mut self, events: Arc<dyn BuildEventSink>) -> Self {
        self.events = events;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Start a full build. The returned handle resolves exactly once.
    pub fn run_full_build(&self) -> HobbesResult<PendingBuild> {
        self.events.on_event(BuildEvent::Started {
            root: self.config.root_dir().to_path_buf(),
            watch: false,
        });
        self.start(Mode::Full)
    }

    /// Rebuild on every change until `running` is cleared
    ///
    /// Fails only when no pass could be completed at all; later faults are
    /// reported as events and the session keeps watching.
    pub fn watch(&self, running: Arc<AtomicBool>) -> HobbesResult<()> {
        self.events.on_event(BuildEvent::Started {
            root: self.config.root_dir().to_path_buf(),
            watch: true,
        });
        let mut build = self.start(Mode::Watch)?;
        tracing::info!(src = %self.config.src_dir().display(), "watching for changes");

        while running.load(Ordering::SeqCst) {
            if build.pending.is_done() {
                thread::sleep(WATCH_POLL);
                continue;
            }
            if let Some(Err(e)) = build.wait_timeout(WATCH_POLL) {
                drop(build);
                self.events.on_event(BuildEvent::Shutdown);
                return Err(e);
            }
        }

        drop(build);
        self.events.on_event(BuildEvent::Shutdown);
        Ok(())
    }

    /// Render the source-tree artifact from a one-off snapshot, writing nothing
    pub fn preview_types(&self) -> HobbesResult<String> {
        let latest: Arc<Mutex<Option<Snapshot>>> = Arc::new(Mutex::new(None));
        let slot = latest.clone();
        let on_snapshot: SnapshotCallback = Box::new(move |snapshot| {
            *slot.lock().unwrap_or_else(|e| e.into_inner()) = Some(snapshot);
        });

        let mut unit = self
            .frontend
            .create(&self.request(), self.storage.clone(), on_snapshot)?;
        let outcome = unit.update(&[]);
        unit.close();
        outcome?;

        let snapshot = latest
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
            .ok_or_else(|| HobbesError::PassFailure {
                message: "compilation unit produced no snapshot".to_string(),
            })?;
        for diagnostic in &snapshot.diagnostics {
            tracing::warn!(%diagnostic, "diagnostic");
        }
        Ok(pass::render_types(
            &self.config,
            &snapshot.components,
            &self.config.src_dir(),
            true,
        ))
    }

    fn request(&self) -> FrontendRequest {
        FrontendRequest {
            config_path: self.config.tsconfig_path(),
            src_dir: self.config.src_dir(),
            options: CompilerOptions {
                out_dir: self.config.out_dir(),
                ..CompilerOptions::default()
            },
        }
    }

    fn start(&self, mode: Mode) -> HobbesResult<PendingBuild> {
        let (completer, pending) = completion::channel();
        let guard = PassGuard::new();
        let shared = Arc::new(Shared {
            config: self.config.clone(),
            mode,
            vfs: Arc::new(VirtualFs::new(self.storage.clone())),
            guard: guard.clone(),
            completer,
            events: self.events.clone(),
            scheduler: OnceLock::new(),
            notifiers: Mutex::new(Vec::new()),
            unit: Mutex::new(None),
            passes: AtomicU64::new(0),
            resolved: AtomicU64::new(0),
            closing: AtomicBool::new(false),
        });

        let on_trigger = shared.clone();
        let trigger: Trigger = Box::new(move |changed| on_trigger.update(changed));
        let on_error = shared.clone();
        let on_fault: FaultHandler = Box::new(move |error| on_error.fault(error));
        let debouncer = Debouncer::spawn(guard, trigger, on_fault)?;
        let handle = debouncer.handle();
        let _ = shared.scheduler.set(handle.clone());

        let build = PendingBuild {
            pending,
            session: Session {
                shared: shared.clone(),
                debouncer: Some(debouncer),
            },
        };

        let weak = Arc::downgrade(&shared);
        let on_snapshot: SnapshotCallback = Box::new(move |snapshot| {
            if let Some(shared) = weak.upgrade() {
                shared.on_snapshot(snapshot);
            }
        });
        let fs: Arc<dyn FileSystem> = shared.vfs.clone();
        match self.frontend.create(&self.request(), fs, on_snapshot) {
            Ok(unit) => *shared.lock_unit() = Some(unit),
            Err(e) => {
                shared.fault(e);
                return Ok(build);
            }
        }

        let artifact = pass::source_types_path(&self.config);
        if let Err(e) = self.observe(&shared, &handle, &artifact) {
            tracing::warn!(path = %artifact.display(), error = %e, "cannot watch declaration artifact");
        }
        if mode == Mode::Watch {
            self.observe(&shared, &handle, &self.config.src_dir())?;
        }

        handle.schedule(self.config.initial_delay());
        Ok(build)
    }

    fn observe(&self, shared: &Shared, handle: &DebounceHandle, target: &Path) -> HobbesResult<()> {
        let vfs = shared.vfs.clone();
        let events = shared.events.clone();
        let handle = handle.clone();
        let delay = shared.config.debounce_delay();
        let callback: ChangeCallback = Arc::new(move |path: &Path| {
            let path = normalize_path(path);
            tracing::debug!(path = %path.display(), "file changed");
            vfs.clear_file_cache(&path);
            events.on_event(BuildEvent::FileChanged { path: path.clone() });
            handle.note_change(path);
            handle.schedule(delay);
        });

        let mut notifier = (self.notifiers)();
        notifier.observe(target, callback)?;
        shared.lock_notifiers().push(notifier);
        Ok(())
    }
}

/// Handle on a running build session
///
/// Dropping it tears the session down: notifiers are closed, the debouncer
/// is stopped and the compilation unit closed.
pub struct PendingBuild {
    pending: Pending<BuildContext>,
    session: Session,
}

impl PendingBuild {
    /// Block until the first pass resolves or the session fails
    pub fn wait(self) -> HobbesResult<BuildContext> {
        let PendingBuild { pending, session } = self;
        let result = pending.wait();
        drop(session);
        result
    }

    pub fn wait_timeout(&mut self, timeout: Duration) -> Option<HobbesResult<BuildContext>> {
        self.pending.wait_timeout(timeout)
    }

    /// Number of passes started so far
    pub fn passes(&self) -> u64 {
        self.session.shared.passes.load(Ordering::SeqCst)
    }

    pub fn guard_state(&self) -> PassState {
        self.session.shared.guard.state()
    }

    /// Number of notifiers still registered
    pub fn active_notifiers(&self) -> usize {
        self.session.shared.lock_notifiers().len()
    }
}

struct Session {
    shared: Arc<Shared>,
    debouncer: Option<Debouncer>,
}

impl Drop for Session {
    fn drop(&mut self) {
        self.shared.closing.store(true, Ordering::SeqCst);
        self.shared.close_notifiers();
        self.shared.cancel_timer();
        if let Some(debouncer) = self.debouncer.take() {
            debouncer.shutdown();
        }
        self.shared.guard.terminate();
        if let Some(mut unit) = self.shared.lock_unit().take() {
            unit.close();
        }
        tracing::debug!(passes = self.shared.passes.load(Ordering::SeqCst), "build session closed");
    }
}

/// State reachable from the debounce worker and the snapshot callback
struct Shared {
    config: Config,
    mode: Mode,
    vfs: Arc<VirtualFs>,
    guard: PassGuard,
    completer: Completer<BuildContext>,
    events: Arc<dyn BuildEventSink>,
    scheduler: OnceLock<DebounceHandle>,
    notifiers: Mutex<Vec<Box<dyn ChangeNotifier>>>,
    unit: Mutex<Option<Box<dyn CompilationUnit>>>,
    passes: AtomicU64,
    resolved: AtomicU64,
    closing: AtomicBool,
}

impl Shared {
    fn lock_unit(&self) -> MutexGuard<'_, Option<Box<dyn CompilationUnit>>> {
        self.unit.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn lock_notifiers(&self) -> MutexGuard<'_, Vec<Box<dyn ChangeNotifier>>> {
        self.notifiers.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Debounce trigger: ask the unit to re-parse
    fn update(&self, changed: Vec<PathBuf>) -> HobbesResult<()> {
        let mut slot = self.lock_unit();
        let Some(unit) = slot.as_mut() else {
            tracing::trace!("no compilation unit, update skipped");
            return Ok(());
        };

        let before = self.passes.load(Ordering::SeqCst);
        tracing::debug!(changed = changed.len(), "updating compilation unit");
        unit.update(&changed)?;

        if self.guard.state() == PassState::Terminal {
            if let Some(mut unit) = slot.take() {
                unit.close();
            }
            return Ok(());
        }

        if self.mode == Mode::Full && before == 0 && self.passes.load(Ordering::SeqCst) == 0 {
            return Err(HobbesError::PassFailure {
                message: "compilation unit produced no consistent snapshot".to_string(),
            });
        }
        Ok(())
    }

    fn on_snapshot(&self, snapshot: Snapshot) {
        let version = snapshot.version;
        let Some(token) = self.guard.try_begin() else {
            tracing::debug!(version, state = ?self.guard.state(), "snapshot superseded");
            self.events.on_event(BuildEvent::Superseded {
                snapshot_version: version,
            });
            return;
        };

        let pass_no = self.passes.fetch_add(1, Ordering::SeqCst) + 1;
        let mut ctx = if pass_no == 1 {
            BuildContext::full_build(pass_no)
        } else {
            BuildContext::rebuild(pass_no)
        };
        ctx.start();
        self.events.on_event(BuildEvent::PassStarted {
            pass: pass_no,
            is_rebuild: ctx.is_rebuild,
        });

        let env = PassEnv {
            config: &self.config,
            vfs: &self.vfs,
            events: self.events.as_ref(),
        };
        pass::build(&env, &mut ctx, snapshot);

        if self.closing.load(Ordering::SeqCst) {
            ctx.supersede();
            tracing::debug!(pass = pass_no, "session closed during pass");
            self.events.on_event(BuildEvent::Superseded {
                snapshot_version: version,
            });
            return;
        }

        ctx.resolve();
        self.resolved.fetch_add(1, Ordering::SeqCst);
        tracing::info!(
            pass = pass_no,
            components = ctx.components.len(),
            diagnostics = ctx.diagnostics().len(),
            "build pass finished"
        );
        self.events.on_event(BuildEvent::PassFinished {
            pass: pass_no,
            components: ctx.components.len(),
            diagnostics: ctx.diagnostics().len(),
            has_error: ctx.has_error(),
            duration_ms: ctx.duration().map(|d| d.as_millis() as u64).unwrap_or(0),
        });

        match self.mode {
            Mode::Full => {
                // Close the watch before resolving.
                self.close_notifiers();
                self.cancel_timer();
                self.guard.terminate();
                drop(token);
                self.complete(pass_no, Ok(ctx));
            }
            Mode::Watch => {
                drop(token);
                if pass_no == 1 {
                    self.complete(pass_no, Ok(ctx));
                }
            }
        }
    }

    fn fault(&self, error: HobbesError) {
        tracing::error!(error = %error, "build failed");
        self.events.on_event(BuildEvent::Error {
            message: error.to_string(),
        });

        let pass_no = self.passes.load(Ordering::SeqCst);
        match self.mode {
            Mode::Full => {
                self.close_notifiers();
                self.cancel_timer();
                self.guard.terminate();
                self.complete(pass_no, Err(error));
            }
            Mode::Watch => {
                if self.resolved.load(Ordering::SeqCst) == 0 {
                    self.complete(pass_no, Err(error));
                }
            }
        }
    }

    fn complete(&self, pass_no: u64, result: HobbesResult<BuildContext>) {
        if let Err(e) = self.completer.complete(pass_no, result) {
            tracing::warn!(error = %e, "build result rejected");
            self.events.on_event(BuildEvent::Error {
                message: e.to_string(),
            });
        }
    }

    fn close_notifiers(&self) {
        let notifiers = std::mem::take(&mut *self.lock_notifiers());
        for mut notifier in notifiers {
            notifier.close();
        }
    }

    fn cancel_timer(&self) {
        if let Some(scheduler) = self.scheduler.get() {
            scheduler.cancel();
        }
    }
}
