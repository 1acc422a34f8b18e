//! Coordinator Factory
//!
//! Wires the build coordinator to its infrastructure.
//! This is the dependency injection point for the application.

use std::path::Path;
use std::sync::Arc;

use crate::application::BuildCoordinator;
use crate::config::{Config, CONFIG_FILE};
use crate::domain::ports::BuildEventSink;
use crate::domain::value_objects::{resolve_path, ConfigWarning};
use crate::error::HobbesResult;
use crate::infrastructure::watch::notify_factory;
use crate::infrastructure::{JsonEventSink, LocalFs, ManifestFrontend};

use super::cli::ProjectArgs;
use super::output::ConsoleEventSink;

/// Resolve the project config: `--config`, else `<root>/hobbes.toml`, else
/// defaults rooted at `<root>`. An explicit `--root` wins over the config
/// file's directory. Environment overrides apply last.
pub fn resolve_config(project: &ProjectArgs, cwd: &Path) -> HobbesResult<(Config, Vec<ConfigWarning>)> {
    let root = resolve_path(cwd, project.root.as_deref().unwrap_or(Path::new(".")));
    let (mut config, warnings) = match &project.config {
        Some(path) => Config::load_with_warnings(&resolve_path(cwd, path))?,
        None => {
            let path = root.join(CONFIG_FILE);
            if path.is_file() {
                Config::load_with_warnings(&path)?
            } else {
                (Config::default().rooted_at(&root), Vec::new())
            }
        }
    };
    if project.root.is_some() {
        config.build.root_dir = root;
    }
    Ok((config.with_env_overrides(), warnings))
}

/// Event sink for a command: NDJSON when `json`, console lines otherwise
pub fn create_event_sink(command: &'static str, json: bool, verbose: u8) -> Arc<dyn BuildEventSink> {
    if json {
        Arc::new(JsonEventSink::stdout(command))
    } else {
        Arc::new(ConsoleEventSink::stdout(verbose))
    }
}

/// Create a coordinator over the local disk, the manifest front-end and
/// `notify` watchers
pub fn create_build_coordinator(config: Config, events: Arc<dyn BuildEventSink>) -> BuildCoordinator {
    BuildCoordinator::new(
        config,
        Arc::new(ManifestFrontend::new()),
        Arc::new(LocalFs::new()),
        notify_factory(),
    )
    .with_event_sink(events)
}
