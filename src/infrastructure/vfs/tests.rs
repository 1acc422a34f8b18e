use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::*;
use crate::domain::ports::FileSystem;
use crate::infrastructure::fs::{LocalFs, MemoryFs};

fn vfs_over(mem: &MemoryFs) -> VirtualFs {
    VirtualFs::new(Arc::new(mem.clone()))
}

#[test]
fn staged_writes_do_not_touch_storage() {
    let mem = MemoryFs::new();
    let vfs = vfs_over(&mem);

    vfs.stage_write("/out/a.js", "x");

    assert_eq!(mem.get(Path::new("/out/a.js")), None);
    assert_eq!(mem.write_count(), 0);
    assert_eq!(vfs.read_file("/out/a.js").unwrap(), "x");
}

#[test]
fn last_staged_write_wins() {
    let mem = MemoryFs::new();
    let vfs = vfs_over(&mem);

    vfs.stage_write("/out/a.js", "x");
    vfs.stage_write("/out/a.js", "y");
    let result = vfs.commit();

    assert_eq!(result.files_written, vec![PathBuf::from("/out/a.js")]);
    assert_eq!(mem.get(Path::new("/out/a.js")).as_deref(), Some("y"));
    assert_eq!(mem.write_count(), 1);
}

#[test]
fn later_removal_replaces_staged_write() {
    let mem = MemoryFs::new();
    mem.insert("/out/a.js", "old");
    let vfs = vfs_over(&mem);

    vfs.stage_write("/out/a.js", "new");
    vfs.stage_remove("/out/a.js");

    assert_eq!(vfs.pending("/out/a.js"), Some(PendingChange::RemoveFile));
    let result = vfs.commit();
    assert!(result.files_written.is_empty());
    assert_eq!(result.files_deleted, vec![PathBuf::from("/out/a.js")]);
}

#[test]
fn staging_normalizes_paths() {
    let mem = MemoryFs::new();
    let vfs = vfs_over(&mem);

    vfs.stage_write("/out/./sub/../a.js", "x");
    vfs.stage_write("/out/a.js", "y");

    assert_eq!(vfs.memory_stats().staged_ops, 1);
    assert_eq!(
        vfs.pending("/out/a.js"),
        Some(PendingChange::WriteFile {
            content: "y".to_string()
        })
    );
}

#[test]
fn unchanged_write_is_not_reported() {
    let mem = MemoryFs::new();
    mem.insert("/out/a.js", "same");
    let vfs = vfs_over(&mem);

    vfs.stage_write("/out/a.js", "same");
    let result = vfs.commit();

    assert!(result.is_empty());
    assert_eq!(mem.write_count(), 0);
}

#[test]
fn second_commit_is_empty() {
    let mem = MemoryFs::new();
    mem.insert("/out/gone.js", "bye");
    let vfs = vfs_over(&mem);

    vfs.stage_write("/out/a.js", "x");
    vfs.stage_remove("/out/gone.js");
    vfs.stage_add_dir("/out/assets");
    let first = vfs.commit();
    assert!(!first.is_empty());

    let second = vfs.commit();
    assert!(second.is_empty());
    assert_eq!(second, CommitResult::default());
}

#[test]
fn commit_creates_missing_parent_dirs() {
    let mem = MemoryFs::new();
    let vfs = vfs_over(&mem);

    vfs.stage_write("/out/nested/a.js", "x");
    let result = vfs.commit();

    assert_eq!(
        result.dirs_added,
        vec![PathBuf::from("/out"), PathBuf::from("/out/nested")]
    );
    assert!(mem.is_dir(Path::new("/out/nested")));
}

#[test]
fn commit_reports_only_levels_it_created() {
    let mem = MemoryFs::new();
    mem.insert("/www/index.html", "<html>");
    let vfs = vfs_over(&mem);

    vfs.stage_write("/www/build/esm/a.js", "a");
    vfs.stage_write("/www/build/b.js", "b");
    let result = vfs.commit();

    assert_eq!(
        result.dirs_added,
        vec![PathBuf::from("/www/build"), PathBuf::from("/www/build/esm")]
    );
    assert!(result.errors.is_empty());
}

#[test]
fn existing_dir_is_not_reported_as_added() {
    let mem = MemoryFs::new();
    mem.insert("/out/keep.js", "k");
    let vfs = vfs_over(&mem);

    vfs.stage_add_dir("/out");
    let result = vfs.commit();

    assert!(result.dirs_added.is_empty());
}

#[test]
fn removing_missing_file_is_silent() {
    let mem = MemoryFs::new();
    let vfs = vfs_over(&mem);

    vfs.stage_remove("/out/never.js");
    let result = vfs.commit();

    assert!(result.is_empty());
}

#[test]
fn non_empty_dir_is_kept() {
    let mem = MemoryFs::new();
    mem.insert("/out/d/still-here.js", "x");
    let vfs = vfs_over(&mem);

    vfs.stage_remove_dir("/out/d");
    let result = vfs.commit();

    assert!(result.dirs_deleted.is_empty());
    assert!(result.errors.is_empty());
    assert!(mem.is_dir(Path::new("/out/d")));
}

#[test]
fn dir_emptied_by_same_commit_is_removed() {
    let mem = MemoryFs::new();
    mem.insert("/out/d/e/a.js", "x");
    let vfs = vfs_over(&mem);

    vfs.stage_remove_dir("/out/d");
    vfs.stage_remove_dir("/out/d/e");
    vfs.stage_remove("/out/d/e/a.js");
    let result = vfs.commit();

    assert_eq!(result.files_deleted, vec![PathBuf::from("/out/d/e/a.js")]);
    assert_eq!(
        result.dirs_deleted,
        vec![PathBuf::from("/out/d"), PathBuf::from("/out/d/e")]
    );
}

#[test]
fn failures_are_recorded_and_commit_continues() {
    let mem = MemoryFs::new();
    mem.fail_on("/out/locked.js");
    let vfs = vfs_over(&mem);

    vfs.stage_write("/out/a.js", "a");
    vfs.stage_write("/out/locked.js", "nope");
    vfs.stage_write("/out/z.js", "z");
    let result = vfs.commit();

    assert_eq!(
        result.files_written,
        vec![PathBuf::from("/out/a.js"), PathBuf::from("/out/z.js")]
    );
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].path, PathBuf::from("/out/locked.js"));
    assert_eq!(result.errors[0].op, CommitOp::Write);
    assert!(!vfs.has_pending());
}

#[test]
fn immediate_write_is_seen_by_later_commit() {
    let mem = MemoryFs::new();
    let vfs = vfs_over(&mem);

    vfs.stage_write("/src/components.d.ts", "stale");
    let written = vfs
        .write_file("/src/components.d.ts", "fresh", WriteOptions::immediate())
        .unwrap();
    assert!(written.changed_content);
    assert!(!written.queued_write);
    assert_eq!(mem.get(Path::new("/src/components.d.ts")).as_deref(), Some("fresh"));

    // Same content staged again: the commit compares against the immediate write.
    vfs.stage_write("/src/components.d.ts", "fresh");
    let result = vfs.commit();
    assert!(!result.was_written(Path::new("/src/components.d.ts")));
    assert_eq!(mem.write_count(), 1);
}

#[test]
fn write_file_reports_unchanged_content() {
    let mem = MemoryFs::new();
    mem.insert("/out/a.js", "x");
    let vfs = vfs_over(&mem);

    let result = vfs.write_file("/out/a.js", "x", WriteOptions::default()).unwrap();
    assert!(!result.changed_content);
    assert!(result.queued_write);

    let result = vfs.write_file("/out/a.js", "y", WriteOptions::default()).unwrap();
    assert!(result.changed_content);
}

#[test]
fn read_is_cached_until_cleared() {
    let mem = MemoryFs::new();
    mem.insert("/src/a.ts", "v1");
    let vfs = vfs_over(&mem);

    assert_eq!(vfs.read_file("/src/a.ts").unwrap(), "v1");
    mem.insert("/src/a.ts", "v2");
    assert_eq!(vfs.read_file("/src/a.ts").unwrap(), "v1");

    vfs.clear_file_cache("/src/a.ts");
    assert_eq!(vfs.read_file("/src/a.ts").unwrap(), "v2");
}

#[test]
fn memory_stats_count_cache_and_staging() {
    let mem = MemoryFs::new();
    mem.insert("/src/a.ts", "abcd");
    let vfs = vfs_over(&mem);

    vfs.read_file("/src/a.ts").unwrap();
    vfs.stage_write("/out/b.js", "xy");
    vfs.stage_remove("/out/c.js");

    let stats = vfs.memory_stats();
    assert_eq!(stats.cached_files, 1);
    assert_eq!(stats.cached_bytes, 4);
    assert_eq!(stats.staged_ops, 2);
    assert_eq!(stats.staged_bytes, 2);
    assert!(stats.to_string().contains("staged 2 ops"));
}

#[test]
fn file_system_view_overlays_staged_state() {
    let mem = MemoryFs::new();
    mem.insert("/src/a.component.json", "{}");
    mem.insert("/src/b.component.json", "{}");
    let vfs = vfs_over(&mem);

    FileSystem::write(&vfs, Path::new("/src/c.component.json"), "{}").unwrap();
    FileSystem::remove_file(&vfs, Path::new("/src/b.component.json")).unwrap();

    assert!(vfs.exists(Path::new("/src/c.component.json")));
    assert!(!vfs.exists(Path::new("/src/b.component.json")));
    let found = vfs.find_files(Path::new("/src"), ".component.json").unwrap();
    assert_eq!(
        found,
        vec![
            PathBuf::from("/src/a.component.json"),
            PathBuf::from("/src/c.component.json")
        ]
    );
}

#[test]
fn commit_to_local_disk() {
    let dir = tempfile::tempdir().unwrap();
    let vfs = VirtualFs::new(Arc::new(LocalFs::new()));
    let out = dir.path().join("www").join("build");

    vfs.stage_write(out.join("app.js"), "console.log(1);\n");
    vfs.stage_write(out.join("app.css"), "body {}\n");
    let result = vfs.commit();

    assert!(result.errors.is_empty());
    assert_eq!(result.files_written.len(), 2);
    assert!(result.dirs_added.contains(&out));
    assert_eq!(
        std::fs::read_to_string(out.join("app.js")).unwrap(),
        "console.log(1);\n"
    );
    assert!(result.changes.iter().all(|c| c.created));

    vfs.stage_write(out.join("app.js"), "console.log(2);\n");
    let result = vfs.commit();
    assert_eq!(result.files_written, vec![out.join("app.js")]);
    assert_eq!(result.changes[0].stats.summary(), "+1, -1");
}
