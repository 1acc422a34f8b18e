//! Domain Ports (Interfaces)
//!
//! These traits define the boundaries of the domain layer.
//! Infrastructure layer provides concrete implementations.

pub mod build_events;
pub mod change_notifier;
pub mod file_system;
pub mod frontend;

pub use build_events::{BuildEvent, BuildEventSink, NoopEventSink};
pub use change_notifier::{ChangeCallback, ChangeNotifier, NotifierFactory};
pub use file_system::{FileSystem, FsError, FsResult};
pub use frontend::{
    CompilationUnit, CompilerOptions, EmittedFile, Frontend, FrontendRequest, Snapshot,
    SnapshotCallback,
};
