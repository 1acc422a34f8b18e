//! Path helpers
//!
//! Staged filesystem intent is keyed by normalized paths, and import
//! specifiers in generated declarations always use forward slashes.

use std::path::{Component, Path, PathBuf};

/// Lexically normalize a path: drop `.` segments and fold `..` into the
/// preceding segment. Does not touch the filesystem or resolve symlinks.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let popped = matches!(
                    out.components().next_back(),
                    Some(Component::Normal(_))
                ) && out.pop();
                if !popped && !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Resolve `path` against `base` when relative, then normalize
pub fn resolve_path(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        normalize_path(path)
    } else {
        normalize_path(&base.join(path))
    }
}

/// Relative path from directory `from` to `to`, both normalized
pub fn relative_path(from: &Path, to: &Path) -> PathBuf {
    let from = normalize_path(from);
    let to = normalize_path(to);
    let from_parts: Vec<_> = from.components().collect();
    let to_parts: Vec<_> = to.components().collect();

    let common = from_parts
        .iter()
        .zip(to_parts.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut rel = PathBuf::new();
    for _ in common..from_parts.len() {
        rel.push("..");
    }
    for part in &to_parts[common..] {
        rel.push(part.as_os_str());
    }
    rel
}

/// Render a path with `/` separators regardless of platform
pub fn to_slash(path: &Path) -> String {
    let parts: Vec<String> = path
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    let joined = parts.join("/");
    if path.has_root() {
        // RootDir renders as "/" which would double up after joining
        format!("/{}", joined.trim_start_matches('/'))
    } else {
        joined
    }
}

/// Module specifier for importing `file` from a module in directory `from_dir`:
/// `./`-prefixed when not climbing, and `.ts`/`.tsx` stripped.
pub fn import_specifier(from_dir: &Path, file: &Path) -> String {
    let rel = to_slash(&relative_path(from_dir, file));
    let rel = if rel.starts_with("../") {
        rel
    } else {
        format!("./{}", rel)
    };
    strip_ts_extension(&rel).to_string()
}

fn strip_ts_extension(specifier: &str) -> &str {
    specifier.strip_suffix(".tsx")
        .or_else(|| specifier.strip_suffix(".ts"))
        .unwrap_or(specifier)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_folds_dots() {
        assert_eq!(
            normalize_path(Path::new("/src/./a/../b/c.ts")),
            PathBuf::from("/src/b/c.ts")
        );
    }

    #[test]
    fn normalize_keeps_leading_parent_on_relative() {
        assert_eq!(normalize_path(Path::new("../a/./b")), PathBuf::from("../a/b"));
    }

    #[test]
    fn normalize_does_not_climb_above_root() {
        assert_eq!(normalize_path(Path::new("/../a")), PathBuf::from("/a"));
    }

    #[test]
    fn resolve_relative_against_base() {
        assert_eq!(
            resolve_path(Path::new("/src/components/card"), Path::new("../../utils/types")),
            PathBuf::from("/src/utils/types")
        );
    }

    #[test]
    fn relative_between_siblings() {
        assert_eq!(
            relative_path(Path::new("/proj/dist/types"), Path::new("/proj/src/a.ts")),
            PathBuf::from("../../src/a.ts")
        );
    }

    #[test]
    fn import_specifier_strips_extension() {
        assert_eq!(
            import_specifier(Path::new("/proj/src"), Path::new("/proj/src/components/card/card.tsx")),
            "./components/card/card"
        );
        assert_eq!(
            import_specifier(Path::new("/proj/src"), Path::new("/proj/shared/types.ts")),
            "../shared/types"
        );
    }

    #[test]
    fn to_slash_absolute() {
        assert_eq!(to_slash(Path::new("/a/b")), "/a/b");
        assert_eq!(to_slash(Path::new("a/b")), "a/b");
    }
}
