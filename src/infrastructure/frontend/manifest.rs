//! Manifest front-end
//!
//! Reads one `*.component.json` manifest per component from the source tree
//! and reports the parsed descriptors as snapshots. It stands in for a real
//! type-checking front-end: no source is parsed, the manifests already hold
//! each component's public surface.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::domain::entities::{ComponentDescriptor, Diagnostic};
use crate::domain::ports::{
    CompilationUnit, EmittedFile, FileSystem, Frontend, FrontendRequest, Snapshot,
    SnapshotCallback,
};
use crate::domain::value_objects::{normalize_path, resolve_path};
use crate::error::{HobbesError, HobbesResult};

/// File name suffix of component manifests
pub const MANIFEST_SUFFIX: &str = ".component.json";

/// Front-end reading component manifests
#[derive(Debug, Clone, Copy, Default)]
pub struct ManifestFrontend;

impl ManifestFrontend {
    pub fn new() -> Self {
        Self
    }
}

impl Frontend for ManifestFrontend {
    fn create(
        &self,
        request: &FrontendRequest,
        fs: Arc<dyn FileSystem>,
        on_snapshot: SnapshotCallback,
    ) -> HobbesResult<Box<dyn CompilationUnit>> {
        check_config(fs.as_ref(), &request.config_path)?;
        Ok(Box::new(ManifestUnit {
            request: request.clone(),
            fs,
            on_snapshot,
            manifests: BTreeMap::new(),
            emitted: BTreeSet::new(),
            scanned: false,
            version: 0,
            closed: false,
        }))
    }
}

fn check_config(fs: &dyn FileSystem, config_path: &Path) -> HobbesResult<()> {
    let content = fs.read(config_path).map_err(|e| HobbesError::PassFailure {
        message: format!("cannot read {}: {}", config_path.display(), e),
    })?;
    serde_json::from_str::<serde_json::Value>(&content).map_err(|e| HobbesError::PassFailure {
        message: format!("invalid {}: {}", config_path.display(), e),
    })?;
    Ok(())
}

fn is_manifest(path: &Path) -> bool {
    path.to_string_lossy().ends_with(MANIFEST_SUFFIX)
}

/// Parse one manifest; `sourceFilePath` is relative to the manifest
pub fn parse_manifest(path: &Path, content: &str) -> Result<ComponentDescriptor, Diagnostic> {
    let mut descriptor: ComponentDescriptor = serde_json::from_str(content).map_err(|e| {
        Diagnostic::error(format!("invalid component manifest: {}", e)).with_file(path)
    })?;
    if !descriptor.tag_name.contains('-') {
        return Err(Diagnostic::error(format!(
            "tag name \"{}\" must contain a dash",
            descriptor.tag_name
        ))
        .with_file(path));
    }
    let dir = path.parent().unwrap_or_else(|| Path::new(""));
    descriptor.source_file_path = resolve_path(dir, &descriptor.source_file_path);
    Ok(descriptor)
}

struct ManifestUnit {
    request: FrontendRequest,
    fs: Arc<dyn FileSystem>,
    on_snapshot: SnapshotCallback,
    manifests: BTreeMap<PathBuf, Result<ComponentDescriptor, Diagnostic>>,
    /// Outputs reported by the previous snapshot
    emitted: BTreeSet<PathBuf>,
    scanned: bool,
    version: u64,
    closed: bool,
}

impl ManifestUnit {
    fn load(&mut self, path: &Path) {
        let entry = match self.fs.read(path) {
            Ok(content) => parse_manifest(path, &content),
            Err(e) if e.is_not_found() => {
                self.manifests.remove(path);
                return;
            }
            Err(e) => Err(Diagnostic::error(format!("cannot read manifest: {}", e)).with_file(path)),
        };
        self.manifests.insert(path.to_path_buf(), entry);
    }

    fn scan(&mut self) -> Vec<Diagnostic> {
        self.manifests.clear();
        let src_dir = normalize_path(&self.request.src_dir);
        let found = match self.fs.find_files(&src_dir, MANIFEST_SUFFIX) {
            Ok(found) => found,
            Err(e) => {
                return vec![Diagnostic::error(format!(
                    "cannot list source directory: {}",
                    e
                ))
                .with_file(src_dir)]
            }
        };
        for path in found {
            self.load(&normalize_path(&path));
        }
        self.scanned = true;
        Vec::new()
    }

    /// Re-read changed manifests. `false` when nothing relevant changed.
    fn refresh(&mut self, changed: &[PathBuf]) -> bool {
        let relevant: BTreeSet<PathBuf> = changed
            .iter()
            .filter(|p| is_manifest(p))
            .map(|p| normalize_path(p))
            .collect();
        for path in &relevant {
            self.load(path);
        }
        !relevant.is_empty()
    }

    fn snapshot(&mut self, mut diagnostics: Vec<Diagnostic>) -> Snapshot {
        let mut by_tag: BTreeMap<String, (PathBuf, ComponentDescriptor)> = BTreeMap::new();
        for (path, entry) in &self.manifests {
            match entry {
                Ok(descriptor) => {
                    if let Some((first, _)) = by_tag.get(&descriptor.tag_name) {
                        diagnostics.push(
                            Diagnostic::error(format!(
                                "duplicate tag \"{}\", first declared in {}",
                                descriptor.tag_name,
                                first.display()
                            ))
                            .with_file(path),
                        );
                        continue;
                    }
                    by_tag.insert(
                        descriptor.tag_name.clone(),
                        (path.clone(), descriptor.clone()),
                    );
                }
                Err(diagnostic) => diagnostics.push(diagnostic.clone()),
            }
        }
        let components: Vec<ComponentDescriptor> =
            by_tag.into_values().map(|(_, descriptor)| descriptor).collect();

        let mut emitted = Vec::new();
        if let Some(out_dir) = &self.request.options.out_dir {
            for cmp in &components {
                match serde_json::to_string_pretty(cmp) {
                    Ok(json) => emitted.push(EmittedFile {
                        path: normalize_path(&out_dir.join(format!("{}.json", cmp.tag_name))),
                        content: json + "\n",
                    }),
                    Err(e) => diagnostics.push(Diagnostic::error(format!(
                        "cannot serialize {}: {}",
                        cmp.tag_name, e
                    ))),
                }
            }
        }
        let now: BTreeSet<PathBuf> = emitted.iter().map(|f| f.path.clone()).collect();
        let removed = self.emitted.difference(&now).cloned().collect();
        self.emitted = now;

        self.version += 1;
        Snapshot {
            version: self.version,
            components,
            diagnostics,
            emitted,
            removed,
        }
    }
}

impl CompilationUnit for ManifestUnit {
    fn update(&mut self, changed: &[PathBuf]) -> HobbesResult<()> {
        if self.closed {
            return Ok(());
        }
        check_config(self.fs.as_ref(), &self.request.config_path)?;

        let diagnostics = if !self.scanned || changed.is_empty() {
            self.scan()
        } else if self.refresh(changed) {
            Vec::new()
        } else {
            tracing::trace!(changed = changed.len(), "no manifest changed, no snapshot");
            return Ok(());
        };

        let snapshot = self.snapshot(diagnostics);
        tracing::debug!(
            version = snapshot.version,
            components = snapshot.components.len(),
            "consistent snapshot"
        );
        (self.on_snapshot)(snapshot);
        Ok(())
    }

    fn close(&mut self) {
        self.closed = true;
    }
}
