//! Configuration loading

use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::value_objects::ConfigWarning;
use crate::error::{HobbesError, HobbesResult};

use super::types::Config;

/// Load configuration and collect non-fatal warnings (e.g. unknown keys).
pub fn load_with_warnings(path: &Path) -> HobbesResult<(Config, Vec<ConfigWarning>)> {
    let content = fs::read_to_string(path)?;

    let mut unknown_paths: Vec<String> = Vec::new();
    let deserializer = toml::de::Deserializer::new(&content);

    let config: Config = serde_ignored::deserialize(deserializer, |p| {
        unknown_paths.push(p.to_string());
    })
    .map_err(|e| HobbesError::InvalidConfig {
        file: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let warnings = unknown_paths
        .into_iter()
        .map(|path_str| {
            let key = path_str
                .split('.')
                .next_back()
                .unwrap_or(path_str.as_str())
                .to_string();
            ConfigWarning {
                key: key.clone(),
                file: path.to_path_buf(),
                line: find_line_number(&content, &key),
                suggestion: suggest_key(&key),
            }
        })
        .collect();

    let base = path.parent().unwrap_or_else(|| Path::new("."));
    Ok((config.rooted_at(base), warnings))
}

/// Apply environment variable overrides (HOBBES_* prefix)
pub fn with_env_overrides(config: Config) -> Config {
    apply_env(config, |key| std::env::var(key).ok())
}

pub(super) fn apply_env(mut config: Config, var: impl Fn(&str) -> Option<String>) -> Config {
    // HOBBES_WATCH_TIMEOUT_MS
    if let Some(value) = var("HOBBES_WATCH_TIMEOUT_MS") {
        match value.trim().parse::<u64>() {
            Ok(ms) => config.build.watch_timeout_ms = Some(ms),
            Err(_) => tracing::warn!(%value, "HOBBES_WATCH_TIMEOUT_MS is not a number, ignored"),
        }
    }

    // HOBBES_SRC_DIR
    if let Some(dir) = var("HOBBES_SRC_DIR") {
        if !dir.is_empty() {
            config.build.src_dir = PathBuf::from(dir);
        }
    }

    // HOBBES_JSON
    if let Some(val) = var("HOBBES_JSON") {
        config.output.json = val.to_lowercase() != "false" && val != "0";
    }

    config
}

fn find_line_number(content: &str, needle: &str) -> Option<usize> {
    for (i, line) in content.lines().enumerate() {
        if line.contains(needle) {
            return Some(i + 1);
        }
    }
    None
}

fn suggest_key(unknown: &str) -> Option<String> {
    const CANDIDATES: &[&str] = &[
        "build",
        "root_dir",
        "src_dir",
        "tsconfig",
        "out_dir",
        "debounce_ms",
        "watch_timeout_ms",
        "types",
        "runtime_module",
        "element_base",
        "destinations",
        "output",
        "json",
    ];

    let mut best: Option<(&str, usize)> = None;
    for candidate in CANDIDATES {
        let dist = levenshtein(unknown, candidate);
        best = match best {
            None => Some((candidate, dist)),
            Some((_, best_dist)) if dist < best_dist => Some((candidate, dist)),
            Some(current) => Some(current),
        };
    }

    match best {
        Some((candidate, dist)) if dist <= 2 => Some(candidate.to_string()),
        _ => None,
    }
}

fn levenshtein(a: &str, b: &str) -> usize {
    if a == b {
        return 0;
    }

    let a_bytes = a.as_bytes();
    let b_bytes = b.as_bytes();

    let mut prev: Vec<usize> = (0..=b_bytes.len()).collect();
    let mut curr = vec![0usize; b_bytes.len() + 1];

    for (i, &ac) in a_bytes.iter().enumerate() {
        curr[0] = i + 1;
        for (j, &bc) in b_bytes.iter().enumerate() {
            let cost = if ac == bc { 0 } else { 1 };
            curr[j + 1] =
                std::cmp::min(std::cmp::min(prev[j + 1] + 1, curr[j] + 1), prev[j] + cost);
        }
        prev.clone_from_slice(&curr);
    }

    prev[b_bytes.len()]
}
