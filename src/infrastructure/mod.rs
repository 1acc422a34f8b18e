//! Infrastructure Layer
//!
//! Concrete implementations of domain ports.
//! This layer handles all I/O operations.
//!
//! ## Structure
//!
//! - `fs/` - Durable storage (local disk, in-memory)
//! - `vfs/` - Staging layer and commit protocol over durable storage
//! - `watch/` - Change notifiers (notify-backed, manual)
//! - `frontend/` - Component manifest front-end
//! - `events/` - Build event sinks

pub mod events;
pub mod frontend;
pub mod fs;
pub mod vfs;
pub mod watch;

// Re-export for convenience
pub use events::JsonEventSink;
pub use frontend::ManifestFrontend;
pub use fs::{LocalFs, MemoryFs};
pub use vfs::{CommitResult, VirtualFs, WriteOptions, WriteResult};
pub use watch::{ManualNotifierHub, NotifyNotifier};
