//! Virtual filesystem
//!
//! Stages writes, removals and directory changes in memory and flushes them
//! to durable storage in one `commit()`. Reads go through a per-path cache,
//! and staged content shadows what is on disk until it is committed.

mod commit;
#[cfg(test)]
mod tests;

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::domain::ports::{FileSystem, FsError, FsResult};
use crate::domain::value_objects::normalize_path;

pub use commit::{CommitError, CommitOp, CommitResult, FileChange};

/// A staged mutation for one path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingChange {
    WriteFile { content: String },
    RemoveFile,
    AddDir,
    RemoveDir,
}

/// How `write_file` should reach storage
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteOptions {
    /// Write through to storage now instead of staging
    pub immediate: bool,
}

impl WriteOptions {
    pub fn immediate() -> Self {
        Self { immediate: true }
    }
}

/// Outcome of `write_file`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteResult {
    /// Content differs from what was visible before the call
    pub changed_content: bool,
    /// The write waits for the next commit
    pub queued_write: bool,
}

/// Cache and staging footprint, logged after each commit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemoryStats {
    pub cached_files: usize,
    pub cached_bytes: usize,
    pub staged_ops: usize,
    pub staged_bytes: usize,
}

impl fmt::Display for MemoryStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "cached {} files ({} bytes), staged {} ops ({} bytes)",
            self.cached_files, self.cached_bytes, self.staged_ops, self.staged_bytes
        )
    }
}

#[derive(Debug, Default)]
struct VfsState {
    cache: HashMap<PathBuf, String>,
    pending: BTreeMap<PathBuf, PendingChange>,
}

/// In-memory staging layer over a `FileSystem`
pub struct VirtualFs {
    storage: Arc<dyn FileSystem>,
    state: Mutex<VfsState>,
}

impl VirtualFs {
    pub fn new(storage: Arc<dyn FileSystem>) -> Self {
        Self {
            storage,
            state: Mutex::new(VfsState::default()),
        }
    }

    /// The durable storage behind this layer
    pub fn storage(&self) -> &Arc<dyn FileSystem> {
        &self.storage
    }

    fn lock(&self) -> MutexGuard<'_, VfsState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn stage(&self, path: &Path, change: PendingChange) {
        let path = normalize_path(path);
        tracing::trace!(path = %path.display(), ?change, "staged");
        let mut state = self.lock();
        state.cache.remove(&path);
        state.pending.insert(path, change);
    }

    /// Stage a file write. A later staged operation on the same path replaces it.
    pub fn stage_write(&self, path: impl AsRef<Path>, content: impl Into<String>) {
        self.stage(
            path.as_ref(),
            PendingChange::WriteFile {
                content: content.into(),
            },
        );
    }

    pub fn stage_remove(&self, path: impl AsRef<Path>) {
        self.stage(path.as_ref(), PendingChange::RemoveFile);
    }

    pub fn stage_add_dir(&self, path: impl AsRef<Path>) {
        self.stage(path.as_ref(), PendingChange::AddDir);
    }

    pub fn stage_remove_dir(&self, path: impl AsRef<Path>) {
        self.stage(path.as_ref(), PendingChange::RemoveDir);
    }

    /// The staged operation for `path`, if any
    pub fn pending(&self, path: impl AsRef<Path>) -> Option<PendingChange> {
        self.lock()
            .pending
            .get(&normalize_path(path.as_ref()))
            .cloned()
    }

    pub fn has_pending(&self) -> bool {
        !self.lock().pending.is_empty()
    }

    /// Read the content visible through this layer: staged, then cached, then storage
    pub fn read_file(&self, path: impl AsRef<Path>) -> FsResult<String> {
        let path = normalize_path(path.as_ref());
        {
            let state = self.lock();
            match state.pending.get(&path) {
                Some(PendingChange::WriteFile { content }) => return Ok(content.clone()),
                Some(PendingChange::RemoveFile) => return Err(FsError::NotFound(path)),
                _ => {}
            }
            if let Some(content) = state.cache.get(&path) {
                return Ok(content.clone());
            }
        }

        let content = self.storage.read(&path)?;
        self.lock().cache.insert(path, content.clone());
        Ok(content)
    }

    /// Write a file, staged by default
    ///
    /// An immediate write reaches storage before this returns and drops any
    /// staged operation for the same path, so a later commit compares against
    /// the new on-disk content.
    pub fn write_file(
        &self,
        path: impl AsRef<Path>,
        content: impl Into<String>,
        options: WriteOptions,
    ) -> FsResult<WriteResult> {
        let path = normalize_path(path.as_ref());
        let content = content.into();
        let changed_content = match self.read_file(&path) {
            Ok(existing) => existing != content,
            Err(_) => true,
        };

        if !options.immediate {
            self.stage_write(&path, content);
            return Ok(WriteResult {
                changed_content,
                queued_write: true,
            });
        }

        if changed_content || !self.storage.exists(&path) {
            self.storage.write(&path, &content)?;
            tracing::debug!(path = %path.display(), "immediate write");
        }
        let mut state = self.lock();
        state.pending.remove(&path);
        state.cache.insert(path, content);
        Ok(WriteResult {
            changed_content,
            queued_write: false,
        })
    }

    /// Forget the cached content of one path
    pub fn clear_file_cache(&self, path: impl AsRef<Path>) {
        let path = normalize_path(path.as_ref());
        if self.lock().cache.remove(&path).is_some() {
            tracing::trace!(path = %path.display(), "cache entry cleared");
        }
    }

    pub fn clear_cache(&self) {
        self.lock().cache.clear();
    }

    pub fn memory_stats(&self) -> MemoryStats {
        let state = self.lock();
        let staged_bytes = state
            .pending
            .values()
            .map(|change| match change {
                PendingChange::WriteFile { content } => content.len(),
                _ => 0,
            })
            .sum();
        MemoryStats {
            cached_files: state.cache.len(),
            cached_bytes: state.cache.values().map(String::len).sum(),
            staged_ops: state.pending.len(),
            staged_bytes,
        }
    }
}

impl fmt::Debug for VirtualFs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VirtualFs")
            .field("stats", &self.memory_stats())
            .finish()
    }
}

/// Lets a compilation unit read and write through the staging layer.
/// Mutations are staged; nothing reaches storage until `commit()`.
impl FileSystem for VirtualFs {
    fn read(&self, path: &Path) -> FsResult<String> {
        self.read_file(path)
    }

    fn write(&self, path: &Path, content: &str) -> FsResult<()> {
        self.stage_write(path, content);
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        match self.pending(path) {
            Some(PendingChange::WriteFile { .. }) | Some(PendingChange::AddDir) => true,
            Some(PendingChange::RemoveFile) | Some(PendingChange::RemoveDir) => false,
            None => self.storage.exists(&normalize_path(path)),
        }
    }

    fn is_dir(&self, path: &Path) -> bool {
        match self.pending(path) {
            Some(PendingChange::AddDir) => true,
            Some(_) => false,
            None => self.storage.is_dir(&normalize_path(path)),
        }
    }

    fn remove_file(&self, path: &Path) -> FsResult<()> {
        self.stage_remove(path);
        Ok(())
    }

    fn create_dir_all(&self, path: &Path) -> FsResult<()> {
        self.stage_add_dir(path);
        Ok(())
    }

    fn remove_dir(&self, path: &Path) -> FsResult<()> {
        self.stage_remove_dir(path);
        Ok(())
    }

    fn is_dir_empty(&self, path: &Path) -> FsResult<bool> {
        self.storage.is_dir_empty(&normalize_path(path))
    }

    fn find_files(&self, dir: &Path, suffix: &str) -> FsResult<Vec<PathBuf>> {
        let dir = normalize_path(dir);
        let mut found = match self.storage.find_files(&dir, suffix) {
            Ok(found) => found,
            Err(e) if e.is_not_found() => Vec::new(),
            Err(e) => return Err(e),
        };
        let state = self.lock();
        found.retain(|path| !matches!(state.pending.get(path), Some(PendingChange::RemoveFile)));
        for (path, change) in &state.pending {
            if matches!(change, PendingChange::WriteFile { .. })
                && path.starts_with(&dir)
                && path.to_string_lossy().ends_with(suffix)
                && !found.contains(path)
            {
                found.push(path.clone());
            }
        }
        found.sort();
        Ok(found)
    }
}
