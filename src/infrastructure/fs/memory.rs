//! In-memory storage
//!
//! A `FileSystem` backed by maps, used by tests and dry runs. Individual
//! paths can be poisoned so commits exercise their partial-failure path.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::domain::ports::file_system::{FileSystem, FsError, FsResult};

#[derive(Debug, Default)]
struct MemoryState {
    files: BTreeMap<PathBuf, String>,
    dirs: BTreeSet<PathBuf>,
    failing: BTreeSet<PathBuf>,
    writes: usize,
}

/// In-memory file system
///
/// Clones share the same underlying state.
#[derive(Debug, Clone, Default)]
pub struct MemoryFs {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryFs {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Seed a file (and its ancestors) without counting it as a write
    pub fn insert(&self, path: impl Into<PathBuf>, content: impl Into<String>) {
        let path = path.into();
        let mut state = self.lock();
        if let Some(parent) = path.parent() {
            add_ancestors(&mut state.dirs, parent);
        }
        state.files.insert(path, content.into());
    }

    /// Make every operation on `path` fail with a permission error
    pub fn fail_on(&self, path: impl Into<PathBuf>) {
        self.lock().failing.insert(path.into());
    }

    /// Content of a file, if present
    pub fn get(&self, path: &Path) -> Option<String> {
        self.lock().files.get(path).cloned()
    }

    /// Number of writes that reached storage
    pub fn write_count(&self) -> usize {
        self.lock().writes
    }

    fn check(&self, state: &MemoryState, path: &Path) -> FsResult<()> {
        if state.failing.contains(path) {
            return Err(FsError::PermissionDenied(path.to_path_buf()));
        }
        Ok(())
    }
}

fn add_ancestors(dirs: &mut BTreeSet<PathBuf>, dir: &Path) {
    for ancestor in dir.ancestors() {
        if ancestor.as_os_str().is_empty() {
            break;
        }
        dirs.insert(ancestor.to_path_buf());
    }
}

impl FileSystem for MemoryFs {
    fn read(&self, path: &Path) -> FsResult<String> {
        let state = self.lock();
        self.check(&state, path)?;
        state
            .files
            .get(path)
            .cloned()
            .ok_or_else(|| FsError::NotFound(path.to_path_buf()))
    }

    fn write(&self, path: &Path, content: &str) -> FsResult<()> {
        let mut state = self.lock();
        self.check(&state, path)?;
        if let Some(parent) = path.parent() {
            add_ancestors(&mut state.dirs, parent);
        }
        state.files.insert(path.to_path_buf(), content.to_string());
        state.writes += 1;
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        let state = self.lock();
        state.files.contains_key(path) || state.dirs.contains(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        (path.has_root() && path.parent().is_none()) || self.lock().dirs.contains(path)
    }

    fn remove_file(&self, path: &Path) -> FsResult<()> {
        let mut state = self.lock();
        self.check(&state, path)?;
        state
            .files
            .remove(path)
            .map(|_| ())
            .ok_or_else(|| FsError::NotFound(path.to_path_buf()))
    }

    fn create_dir_all(&self, path: &Path) -> FsResult<()> {
        let mut state = self.lock();
        self.check(&state, path)?;
        add_ancestors(&mut state.dirs, path);
        Ok(())
    }

    fn remove_dir(&self, path: &Path) -> FsResult<()> {
        if !self.is_dir_empty(path)? {
            return Err(FsError::NotEmpty(path.to_path_buf()));
        }
        let mut state = self.lock();
        self.check(&state, path)?;
        state.dirs.remove(path);
        Ok(())
    }

    fn is_dir_empty(&self, path: &Path) -> FsResult<bool> {
        let state = self.lock();
        if !state.dirs.contains(path) {
            return Err(FsError::NotFound(path.to_path_buf()));
        }
        let has_file = state.files.keys().any(|f| f.parent() == Some(path));
        let has_dir = state.dirs.iter().any(|d| d.parent() == Some(path));
        Ok(!has_file && !has_dir)
    }

    fn find_files(&self, dir: &Path, suffix: &str) -> FsResult<Vec<PathBuf>> {
        let state = self.lock();
        if !state.dirs.contains(dir) {
            return Err(FsError::NotFound(dir.to_path_buf()));
        }
        Ok(state
            .files
            .keys()
            .filter(|f| f.starts_with(dir))
            .filter(|f| f.to_string_lossy().ends_with(suffix))
            .cloned()
            .collect())
    }
}
