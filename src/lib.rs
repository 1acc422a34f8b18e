//! Hobbes - incremental build orchestration for component compilers
//!
//! Hobbes drives an external incremental compiler: it debounces change
//! notifications, runs at most one build pass at a time, stages every output
//! in a virtual filesystem and commits the batch to disk, and aggregates the
//! per-component declarations into a single `components.d.ts`.

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod presentation;

// Re-exports for convenience
pub use application::{BuildCoordinator, PendingBuild};
pub use config::Config;
pub use domain::entities::{BuildContext, ComponentDescriptor, Diagnostic};
pub use error::{HobbesError, HobbesResult};
pub use infrastructure::vfs::{CommitResult, VirtualFs};
