//! Local File System Implementation
//!
//! Implements the FileSystem port for local disk operations.

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::domain::ports::file_system::{FileSystem, FsError, FsResult};

/// Local file system implementation
///
/// Writes go through a temp file in the target directory and are renamed
/// into place, so readers never observe a half-written file.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

impl LocalFs {
    /// Create a new LocalFs instance
    pub fn new() -> Self {
        Self
    }
}

/// Write content to a file atomically (tempfile + rename)
pub fn atomic_write(path: &Path, content: &[u8]) -> FsResult<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent).map_err(|e| FsError::at(parent, e))?;

    let mut tmp = tempfile::NamedTempFile::new_in(parent).map_err(|e| FsError::at(parent, e))?;
    tmp.write_all(content).map_err(|e| FsError::at(path, e))?;
    tmp.flush().map_err(|e| FsError::at(path, e))?;
    tmp.persist(path).map_err(|e| FsError::at(path, e.error))?;
    Ok(())
}

impl FileSystem for LocalFs {
    fn read(&self, path: &Path) -> FsResult<String> {
        std::fs::read_to_string(path).map_err(|e| FsError::at(path, e))
    }

    fn write(&self, path: &Path, content: &str) -> FsResult<()> {
        atomic_write(path, content.as_bytes())
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn remove_file(&self, path: &Path) -> FsResult<()> {
        std::fs::remove_file(path).map_err(|e| FsError::at(path, e))
    }

    fn create_dir_all(&self, path: &Path) -> FsResult<()> {
        std::fs::create_dir_all(path).map_err(|e| FsError::at(path, e))
    }

    fn remove_dir(&self, path: &Path) -> FsResult<()> {
        if !self.is_dir_empty(path)? {
            return Err(FsError::NotEmpty(path.to_path_buf()));
        }
        std::fs::remove_dir(path).map_err(|e| FsError::at(path, e))
    }

    fn is_dir_empty(&self, path: &Path) -> FsResult<bool> {
        let mut entries = std::fs::read_dir(path).map_err(|e| FsError::at(path, e))?;
        Ok(entries.next().is_none())
    }

    fn find_files(&self, dir: &Path, suffix: &str) -> FsResult<Vec<PathBuf>> {
        if !dir.is_dir() {
            return Err(FsError::NotFound(dir.to_path_buf()));
        }

        let mut found = Vec::new();
        for entry in ignore::WalkBuilder::new(dir).hidden(true).build() {
            let entry = entry.map_err(|e| FsError::Other(e.to_string()))?;
            let is_file = entry.file_type().map(|t| t.is_file()).unwrap_or(false);
            if is_file
                && entry
                    .file_name()
                    .to_str()
                    .map(|name| name.ends_with(suffix))
                    .unwrap_or(false)
            {
                found.push(entry.into_path());
            }
        }
        found.sort();
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn local_fs_write_and_read() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("test.txt");
        let fs = LocalFs::new();

        fs.write(&file, "hello world").unwrap();
        let content = fs.read(&file).unwrap();

        assert_eq!(content, "hello world");
    }

    #[test]
    fn local_fs_write_creates_parent_dirs() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("nested").join("dir").join("test.txt");
        let fs = LocalFs::new();

        fs.write(&file, "content").unwrap();

        assert!(file.exists());
    }

    #[test]
    fn local_fs_write_overwrites() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("test.txt");
        std::fs::write(&file, "Original").unwrap();

        LocalFs::new().write(&file, "Replaced").unwrap();

        assert_eq!(std::fs::read_to_string(&file).unwrap(), "Replaced");
    }

    #[test]
    fn local_fs_read_missing_is_not_found() {
        let dir = tempdir().unwrap();
        let err = LocalFs::new().read(&dir.path().join("missing")).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn local_fs_remove_dir_refuses_non_empty() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("a");
        let fs = LocalFs::new();
        fs.write(&nested.join("keep.txt"), "x").unwrap();

        let err = fs.remove_dir(&nested).unwrap_err();
        assert!(matches!(err, FsError::NotEmpty(_)));
        assert!(nested.is_dir());

        fs.remove_file(&nested.join("keep.txt")).unwrap();
        fs.remove_dir(&nested).unwrap();
        assert!(!nested.exists());
    }

    #[test]
    fn local_fs_find_files_by_suffix() {
        let dir = tempdir().unwrap();
        let fs = LocalFs::new();
        fs.write(&dir.path().join("b/cmp-b.component.json"), "{}").unwrap();
        fs.write(&dir.path().join("a/cmp-a.component.json"), "{}").unwrap();
        fs.write(&dir.path().join("a/cmp-a.tsx"), "").unwrap();

        let found = fs.find_files(dir.path(), ".component.json").unwrap();

        assert_eq!(found.len(), 2);
        assert!(found[0].ends_with("a/cmp-a.component.json"));
        assert!(found[1].ends_with("b/cmp-b.component.json"));
    }
}
