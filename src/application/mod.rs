//! Application Layer
//!
//! Use cases that orchestrate the build flow.
//! This layer:
//! - Depends on Domain layer (entities, services, ports)
//! - Does NOT contain business rules (those are in Domain)
//! - Coordinates between Infrastructure and Domain
//!
//! ## Use Cases
//!
//! - `BuildCoordinator` - Full builds and watch sessions
//! - `Debouncer` / `PassGuard` - Timer and reentrancy guard driving passes

pub mod build;
pub mod scheduler;

pub use build::{BuildCoordinator, PendingBuild};
pub use scheduler::{DebounceHandle, Debouncer, PassGuard, PassState};
