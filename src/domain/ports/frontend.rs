//! Front-end port - the external incremental-compilation unit
//!
//! Parsing and type-checking live outside this crate. The coordinator only
//! needs a unit it can ask to re-parse and that reports each consistent
//! state it reaches through the snapshot callback given at creation.

use std::path::PathBuf;
use std::sync::Arc;

use crate::domain::entities::{ComponentDescriptor, Diagnostic};
use crate::error::HobbesResult;

use super::file_system::FileSystem;

/// Compiler options the coordinator forces on the front-end
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerOptions {
    /// Where transpiled output goes
    pub out_dir: Option<PathBuf>,
    pub declaration: bool,
    pub incremental: bool,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            out_dir: None,
            declaration: true,
            incremental: true,
        }
    }
}

/// Everything needed to create a compilation unit
#[derive(Debug, Clone)]
pub struct FrontendRequest {
    /// Front-end project file (e.g. `tsconfig.json`)
    pub config_path: PathBuf,
    pub src_dir: PathBuf,
    pub options: CompilerOptions,
}

/// A file the front-end produced for this snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmittedFile {
    pub path: PathBuf,
    pub content: String,
}

/// A consistent state of the compiled program
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    /// Increases with every snapshot from the same unit
    pub version: u64,
    pub components: Vec<ComponentDescriptor>,
    pub diagnostics: Vec<Diagnostic>,
    pub emitted: Vec<EmittedFile>,
    /// Outputs from earlier snapshots that no longer exist
    pub removed: Vec<PathBuf>,
}

/// Called by the unit every time it reaches a consistent state
pub type SnapshotCallback = Box<dyn FnMut(Snapshot) + Send>;

/// Creates compilation units
pub trait Frontend: Send + Sync {
    /// Create a unit. `fs` is the storage adapter the unit must read through.
    fn create(
        &self,
        request: &FrontendRequest,
        fs: Arc<dyn FileSystem>,
        on_snapshot: SnapshotCallback,
    ) -> HobbesResult<Box<dyn CompilationUnit>>;
}

/// A live incremental program
pub trait CompilationUnit: Send {
    /// Re-parse inputs. `changed` lists the paths reported since the last
    /// update; empty means "everything". Calls the snapshot callback zero or
    /// more times. An `Err` means no consistent snapshot could be produced.
    fn update(&mut self, changed: &[PathBuf]) -> HobbesResult<()>;

    /// Release the unit's resources. Further updates are no-ops.
    fn close(&mut self);
}
