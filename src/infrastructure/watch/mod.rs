//! Change notifier implementations

mod manual;
mod notifier;

pub use manual::{ManualNotifier, ManualNotifierHub};
pub use notifier::{notify_factory, NotifyNotifier};
