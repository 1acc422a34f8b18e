//! Commit protocol
//!
//! Order: directory creations, file writes, file removals, directory
//! removals. Every operation is attempted; failures are recorded per path.

use std::collections::BTreeSet;
use std::fmt;
use std::mem;
use std::path::{Path, PathBuf};

use crate::domain::ports::FsError;
use crate::domain::services::{DiffStats, Differ};

use super::{PendingChange, VirtualFs};

/// Which commit step an error belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CommitOp {
    CreateDir,
    Write,
    RemoveFile,
    RemoveDir,
}

impl fmt::Display for CommitOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CommitOp::CreateDir => "create dir",
            CommitOp::Write => "write",
            CommitOp::RemoveFile => "remove file",
            CommitOp::RemoveDir => "remove dir",
        };
        f.write_str(name)
    }
}

/// A single failed operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitError {
    pub path: PathBuf,
    pub op: CommitOp,
    pub message: String,
}

impl fmt::Display for CommitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.op, self.path.display(), self.message)
    }
}

/// Line-level change for a written file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChange {
    pub path: PathBuf,
    /// The file did not exist before the commit
    pub created: bool,
    pub stats: DiffStats,
}

/// What a commit actually changed on storage
///
/// All path lists are sorted. Unchanged writes and removals of missing
/// files do not appear.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitResult {
    pub files_written: Vec<PathBuf>,
    pub files_deleted: Vec<PathBuf>,
    pub dirs_added: Vec<PathBuf>,
    pub dirs_deleted: Vec<PathBuf>,
    pub errors: Vec<CommitError>,
    pub changes: Vec<FileChange>,
}

impl CommitResult {
    /// Nothing changed and nothing failed
    pub fn is_empty(&self) -> bool {
        self.files_written.is_empty()
            && self.files_deleted.is_empty()
            && self.dirs_added.is_empty()
            && self.dirs_deleted.is_empty()
            && self.errors.is_empty()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn was_written(&self, path: &Path) -> bool {
        self.files_written.iter().any(|p| p == path)
    }

    fn fail(&mut self, path: &Path, op: CommitOp, message: impl fmt::Display) {
        tracing::warn!(path = %path.display(), %op, error = %message, "commit operation failed");
        self.errors.push(CommitError {
            path: path.to_path_buf(),
            op,
            message: message.to_string(),
        });
    }
}

impl VirtualFs {
    /// Flush staged operations to storage
    ///
    /// Staged intent is cleared up front, so it is gone whether or not the
    /// individual operations succeed.
    pub fn commit(&self) -> CommitResult {
        let pending = mem::take(&mut self.lock().pending);
        let mut result = CommitResult::default();
        if pending.is_empty() {
            return result;
        }

        let mut dirs_to_add = BTreeSet::new();
        let mut writes = Vec::new();
        let mut removals = Vec::new();
        let mut dirs_to_remove = Vec::new();
        for (path, change) in pending {
            match change {
                PendingChange::WriteFile { content } => {
                    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                        dirs_to_add.insert(parent.to_path_buf());
                    }
                    writes.push((path, content));
                }
                PendingChange::RemoveFile => removals.push(path),
                PendingChange::AddDir => {
                    dirs_to_add.insert(path);
                }
                PendingChange::RemoveDir => dirs_to_remove.push(path),
            }
        }

        self.commit_ensure_dirs(&dirs_to_add, &mut result);
        self.commit_writes(writes, &mut result);
        self.commit_removals(removals, &mut result);
        self.commit_remove_dirs(dirs_to_remove, &mut result);

        result.files_written.sort();
        result.files_deleted.sort();
        result.dirs_added.sort();
        result.dirs_deleted.sort();

        tracing::debug!(
            written = result.files_written.len(),
            deleted = result.files_deleted.len(),
            dirs_added = result.dirs_added.len(),
            dirs_deleted = result.dirs_deleted.len(),
            errors = result.errors.len(),
            "commit finished"
        );
        tracing::debug!("{}", self.memory_stats());
        result
    }

    fn commit_ensure_dirs(&self, dirs: &BTreeSet<PathBuf>, result: &mut CommitResult) {
        // Sorted order visits ancestors before descendants.
        for dir in dirs {
            for level in self.missing_levels(dir) {
                match self.storage.create_dir_all(&level) {
                    Ok(()) => result.dirs_added.push(level),
                    Err(e) => {
                        result.fail(&level, CommitOp::CreateDir, e);
                        break;
                    }
                }
            }
        }
    }

    /// Missing directories from the outermost down to `dir` itself
    fn missing_levels(&self, dir: &Path) -> Vec<PathBuf> {
        let mut levels: Vec<PathBuf> = dir
            .ancestors()
            .take_while(|p| !p.as_os_str().is_empty() && !self.storage.is_dir(p))
            .map(Path::to_path_buf)
            .collect();
        levels.reverse();
        levels
    }

    fn commit_writes(&self, writes: Vec<(PathBuf, String)>, result: &mut CommitResult) {
        let differ = Differ::new();
        for (path, content) in writes {
            let existing = self.storage.read(&path).ok();
            if existing.as_deref() == Some(content.as_str()) {
                tracing::trace!(path = %path.display(), "unchanged, skipped");
                self.lock().cache.insert(path, content);
                continue;
            }

            match self.storage.write(&path, &content) {
                Ok(()) => {
                    let stats = differ.stats(existing.as_deref().unwrap_or(""), &content);
                    result.changes.push(FileChange {
                        path: path.clone(),
                        created: existing.is_none(),
                        stats,
                    });
                    result.files_written.push(path.clone());
                    self.lock().cache.insert(path, content);
                }
                Err(e) => result.fail(&path, CommitOp::Write, e),
            }
        }
    }

    fn commit_removals(&self, removals: Vec<PathBuf>, result: &mut CommitResult) {
        for path in removals {
            self.lock().cache.remove(&path);
            if !self.storage.exists(&path) {
                continue;
            }
            match self.storage.remove_file(&path) {
                Ok(()) => result.files_deleted.push(path),
                Err(e) if e.is_not_found() => {}
                Err(e) => result.fail(&path, CommitOp::RemoveFile, e),
            }
        }
    }

    fn commit_remove_dirs(&self, mut dirs: Vec<PathBuf>, result: &mut CommitResult) {
        // Deepest first so emptied children free their parents.
        dirs.sort_by(|a, b| {
            b.components()
                .count()
                .cmp(&a.components().count())
                .then_with(|| b.cmp(a))
        });
        for dir in dirs {
            if !self.storage.is_dir(&dir) {
                continue;
            }
            match self.storage.is_dir_empty(&dir) {
                Ok(true) => {}
                Ok(false) => {
                    tracing::debug!(path = %dir.display(), "directory not empty, kept");
                    continue;
                }
                Err(e) => {
                    result.fail(&dir, CommitOp::RemoveDir, e);
                    continue;
                }
            }
            match self.storage.remove_dir(&dir) {
                Ok(()) => result.dirs_deleted.push(dir),
                Err(FsError::NotEmpty(_)) => {}
                Err(e) => result.fail(&dir, CommitOp::RemoveDir, e),
            }
        }
    }
}
