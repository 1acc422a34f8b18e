//! Differ Domain Service
//!
//! Line-level change statistics between the on-disk and committed content
//! of a file, reported with each commit.

use similar::{ChangeTag, TextDiff};

/// Line counts for one before/after pair
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiffStats {
    pub additions: usize,
    pub deletions: usize,
}

impl DiffStats {
    pub fn has_changes(&self) -> bool {
        self.additions > 0 || self.deletions > 0
    }

    /// e.g. "+5, -3"
    pub fn summary(&self) -> String {
        format!("+{}, -{}", self.additions, self.deletions)
    }
}

/// Differ service for computing file differences
#[derive(Debug, Clone, Copy, Default)]
pub struct Differ;

impl Differ {
    pub fn new() -> Self {
        Self
    }

    /// Count inserted and deleted lines from `old` to `new`
    pub fn stats(&self, old: &str, new: &str) -> DiffStats {
        let mut stats = DiffStats::default();
        for change in TextDiff::from_lines(old, new).iter_all_changes() {
            match change.tag() {
                ChangeTag::Delete => stats.deletions += 1,
                ChangeTag::Insert => stats.additions += 1,
                ChangeTag::Equal => {}
            }
        }
        stats
    }
}
