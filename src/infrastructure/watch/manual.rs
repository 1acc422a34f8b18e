//! Hand-driven change notifier
//!
//! For embedders that receive change events from their own source (an
//! editor, a dev server) and for tests. Notifiers created from one hub share
//! it; `ManualNotifierHub::fire` delivers to every open registration whose
//! path contains the changed path.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::domain::ports::{ChangeCallback, ChangeNotifier, NotifierFactory};
use crate::error::HobbesResult;

struct Registration {
    id: usize,
    path: PathBuf,
    on_change: ChangeCallback,
}

#[derive(Default)]
struct HubState {
    registrations: Vec<Registration>,
    next_id: usize,
}

#[derive(Clone, Default)]
pub struct ManualNotifierHub {
    state: Arc<Mutex<HubState>>,
}

impl ManualNotifierHub {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HubState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn notifier(&self) -> ManualNotifier {
        let mut state = self.lock();
        state.next_id += 1;
        ManualNotifier {
            hub: self.clone(),
            id: state.next_id,
        }
    }

    pub fn factory(&self) -> NotifierFactory {
        let hub = self.clone();
        Arc::new(move || -> Box<dyn ChangeNotifier> { Box::new(hub.notifier()) })
    }

    /// Report a change. Returns how many callbacks ran.
    pub fn fire(&self, path: impl AsRef<Path>) -> usize {
        let path = path.as_ref();
        let callbacks: Vec<ChangeCallback> = self
            .lock()
            .registrations
            .iter()
            .filter(|r| path.starts_with(&r.path))
            .map(|r| r.on_change.clone())
            .collect();
        for callback in &callbacks {
            callback(path);
        }
        callbacks.len()
    }

    /// Paths with an open registration, sorted
    pub fn observed(&self) -> Vec<PathBuf> {
        let mut paths: Vec<_> = self
            .lock()
            .registrations
            .iter()
            .map(|r| r.path.clone())
            .collect();
        paths.sort();
        paths
    }

    fn unregister(&self, id: usize) -> bool {
        let mut state = self.lock();
        let before = state.registrations.len();
        state.registrations.retain(|r| r.id != id);
        before != state.registrations.len()
    }
}

pub struct ManualNotifier {
    hub: ManualNotifierHub,
    id: usize,
}

impl ChangeNotifier for ManualNotifier {
    fn observe(&mut self, path: &Path, on_change: ChangeCallback) -> HobbesResult<()> {
        self.hub.unregister(self.id);
        self.hub.lock().registrations.push(Registration {
            id: self.id,
            path: path.to_path_buf(),
            on_change,
        });
        Ok(())
    }

    fn close(&mut self) {
        self.hub.unregister(self.id);
    }

    fn is_closed(&self) -> bool {
        !self.hub.lock().registrations.iter().any(|r| r.id == self.id)
    }
}

impl Drop for ManualNotifier {
    fn drop(&mut self) {
        self.close();
    }
}
