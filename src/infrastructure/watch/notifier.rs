//! `notify`-backed change notifier
//!
//! A file is observed by watching its parent directory non-recursively and
//! keeping only events for that file name. A directory is watched
//! recursively.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};

use crate::domain::ports::{ChangeCallback, ChangeNotifier, NotifierFactory};
use crate::error::{HobbesError, HobbesResult};

/// Change notifier backed by the platform watcher
#[derive(Default)]
pub struct NotifyNotifier {
    watcher: Option<RecommendedWatcher>,
    closed: Arc<AtomicBool>,
    target: Option<PathBuf>,
}

impl NotifyNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// The path currently observed
    pub fn target(&self) -> Option<&Path> {
        self.target.as_deref()
    }
}

/// Factory producing a fresh `NotifyNotifier` per observed path
pub fn notify_factory() -> NotifierFactory {
    Arc::new(|| -> Box<dyn ChangeNotifier> { Box::new(NotifyNotifier::new()) })
}

impl ChangeNotifier for NotifyNotifier {
    fn observe(&mut self, path: &Path, on_change: ChangeCallback) -> HobbesResult<()> {
        self.close();

        let closed = Arc::new(AtomicBool::new(false));
        let (watch_root, mode, file_name) = if path.is_dir() {
            (path.to_path_buf(), RecursiveMode::Recursive, None)
        } else {
            let parent = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            (
                parent.to_path_buf(),
                RecursiveMode::NonRecursive,
                path.file_name().map(|n| n.to_os_string()),
            )
        };

        let flag = closed.clone();
        let mut watcher = RecommendedWatcher::new(
            move |res: Result<Event, notify::Error>| {
                if flag.load(Ordering::SeqCst) {
                    return;
                }
                let event = match res {
                    Ok(event) => event,
                    Err(e) => {
                        tracing::warn!(error = %e, "watch error");
                        return;
                    }
                };
                if event.kind.is_access() {
                    return;
                }
                for changed in &event.paths {
                    let relevant = match &file_name {
                        Some(name) => changed.file_name() == Some(name.as_os_str()),
                        None => true,
                    };
                    if relevant {
                        on_change(changed);
                    }
                }
            },
            Config::default(),
        )?;

        watcher
            .watch(&watch_root, mode)
            .map_err(|e| HobbesError::Watch {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        tracing::debug!(path = %path.display(), "observing");

        self.watcher = Some(watcher);
        self.closed = closed;
        self.target = Some(path.to_path_buf());
        Ok(())
    }

    fn close(&mut self) {
        self.closed.store(true, Ordering::SeqCst);
        if self.watcher.take().is_some() {
            if let Some(target) = &self.target {
                tracing::debug!(path = %target.display(), "stopped observing");
            }
        }
    }

    fn is_closed(&self) -> bool {
        self.watcher.is_none()
    }
}

impl Drop for NotifyNotifier {
    fn drop(&mut self) {
        self.close();
    }
}
