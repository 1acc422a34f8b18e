//! Debounced, reentrancy-guarded build scheduling

mod debouncer;
mod guard;

pub use debouncer::{DebounceHandle, Debouncer, FaultHandler, Trigger};
pub use guard::{PassGuard, PassState, PassToken};
