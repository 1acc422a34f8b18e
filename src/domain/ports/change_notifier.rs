//! Change notifier port
//!
//! A deliberately narrow watch interface: a notifier registers interest in
//! exactly one path (a file, or a directory tree) and reports changes under
//! it. Anything wider is a second notifier.

use std::path::Path;
use std::sync::Arc;

use crate::error::HobbesResult;

/// Invoked with the changed path
pub type ChangeCallback = Arc<dyn Fn(&Path) + Send + Sync>;

pub trait ChangeNotifier: Send {
    /// Start observing `path`, replacing any earlier registration
    fn observe(&mut self, path: &Path, on_change: ChangeCallback) -> HobbesResult<()>;

    /// Stop observing. Idempotent; no callback runs after this returns.
    fn close(&mut self);

    fn is_closed(&self) -> bool;
}

/// Produces a fresh notifier per observed path
pub type NotifierFactory = Arc<dyn Fn() -> Box<dyn ChangeNotifier> + Send + Sync>;
