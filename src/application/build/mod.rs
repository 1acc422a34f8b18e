//! Build coordination
//!
//! - `BuildCoordinator` - full builds and watch sessions over a compilation unit
//! - `pass` - one snapshot through staging, aggregation and commit
//! - `completion` - one-shot result channel rejecting a second completion

pub mod completion;
mod coordinator;
pub mod pass;


pub use completion::{Completer, Pending};
pub use coordinator::{BuildCoordinator, PendingBuild};
pub use pass::{generate_app_types, render_types, source_types_path, write_build, PassEnv};
