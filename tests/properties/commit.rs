//! Property tests for the commit protocol.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use proptest::prelude::*;

use hobbes::infrastructure::{MemoryFs, VirtualFs};

fn files() -> impl Strategy<Value = BTreeMap<String, String>> {
    proptest::collection::btree_map("[a-c]/[a-c]\\.js", "[a-z ]{0,16}", 1..8)
}

fn stage_all(vfs: &VirtualFs, files: &BTreeMap<String, String>) {
    for (path, content) in files {
        vfs.stage_write(PathBuf::from("/out").join(path), content.clone());
    }
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: committing the same staged content twice changes nothing
    /// the second time.
    #[test]
    fn property_commit_is_idempotent(files in files()) {
        let storage = MemoryFs::new();
        let vfs = VirtualFs::new(Arc::new(storage.clone()));

        stage_all(&vfs, &files);
        let first = vfs.commit();
        let writes = storage.write_count();

        stage_all(&vfs, &files);
        let second = vfs.commit();

        prop_assert_eq!(first.files_written.len(), files.len());
        prop_assert!(second.is_empty());
        prop_assert_eq!(storage.write_count(), writes);
    }

    /// PROPERTY: after a commit, storage holds exactly the staged content.
    #[test]
    fn property_commit_reaches_storage(files in files()) {
        let storage = MemoryFs::new();
        let vfs = VirtualFs::new(Arc::new(storage.clone()));

        stage_all(&vfs, &files);
        let result = vfs.commit();

        prop_assert!(!result.has_errors());
        for (path, content) in &files {
            let path = PathBuf::from("/out").join(path);
            let stored = storage.get(&path);
            prop_assert_eq!(stored.as_deref(), Some(content.as_str()));
        }
    }
}
