//! Configuration type definitions

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{resolve_path, ConfigWarning};
use crate::error::HobbesResult;

use super::loader;

/// Project config file name, looked up in the project root
pub const CONFIG_FILE: &str = "hobbes.toml";

/// Build pipeline configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Project root; relative values are resolved against the config file's directory
    #[serde(default = "default_root_dir")]
    pub root_dir: PathBuf,

    #[serde(default = "default_src_dir")]
    pub src_dir: PathBuf,

    /// Front-end project file
    #[serde(default = "default_tsconfig")]
    pub tsconfig: PathBuf,

    /// Where the front-end's emitted files go
    #[serde(default)]
    pub out_dir: Option<PathBuf>,

    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Overrides every scheduled delay when set, including `0`
    #[serde(default)]
    pub watch_timeout_ms: Option<u64>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            root_dir: default_root_dir(),
            src_dir: default_src_dir(),
            tsconfig: default_tsconfig(),
            out_dir: None,
            debounce_ms: default_debounce_ms(),
            watch_timeout_ms: None,
        }
    }
}

fn default_root_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_src_dir() -> PathBuf {
    PathBuf::from("src")
}

fn default_tsconfig() -> PathBuf {
    PathBuf::from("tsconfig.json")
}

fn default_debounce_ms() -> u64 {
    100
}

/// Declaration artifact configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypesConfig {
    /// Module the generated declarations import the runtime from
    #[serde(default = "default_runtime_module")]
    pub runtime_module: String,

    /// Base interface every generated element extends
    #[serde(default = "default_element_base")]
    pub element_base: String,

    /// Extra directories that receive a public copy of the artifact
    #[serde(default)]
    pub destinations: Vec<PathBuf>,
}

impl Default for TypesConfig {
    fn default() -> Self {
        Self {
            runtime_module: default_runtime_module(),
            element_base: default_element_base(),
            destinations: Vec::new(),
        }
    }
}

fn default_runtime_module() -> String {
    "@hobbes/core".to_string()
}

fn default_element_base() -> String {
    "HTMLHobbesElement".to_string()
}

/// Output configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Emit NDJSON events instead of text
    #[serde(default)]
    pub json: bool,
}

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub build: BuildConfig,

    #[serde(default)]
    pub types: TypesConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> HobbesResult<Self> {
        let (config, _warnings) = loader::load_with_warnings(path)?;
        Ok(config)
    }

    /// Load configuration and collect non-fatal warnings (unknown keys)
    pub fn load_with_warnings(path: &Path) -> HobbesResult<(Self, Vec<ConfigWarning>)> {
        loader::load_with_warnings(path)
    }

    /// Apply `HOBBES_*` environment overrides
    pub fn with_env_overrides(self) -> Self {
        loader::with_env_overrides(self)
    }

    /// Make `root_dir` absolute against `base`
    pub fn rooted_at(mut self, base: &Path) -> Self {
        self.build.root_dir = resolve_path(base, &self.build.root_dir);
        self
    }

    pub fn root_dir(&self) -> &Path {
        &self.build.root_dir
    }

    pub fn src_dir(&self) -> PathBuf {
        resolve_path(&self.build.root_dir, &self.build.src_dir)
    }

    pub fn tsconfig_path(&self) -> PathBuf {
        resolve_path(&self.build.root_dir, &self.build.tsconfig)
    }

    pub fn out_dir(&self) -> Option<PathBuf> {
        self.build
            .out_dir
            .as_ref()
            .map(|dir| resolve_path(&self.build.root_dir, dir))
    }

    /// Declaration destinations other than the source tree
    pub fn type_destinations(&self) -> Vec<PathBuf> {
        self.types
            .destinations
            .iter()
            .map(|dir| resolve_path(&self.build.root_dir, dir))
            .collect()
    }

    /// Delay the scheduler is armed with
    pub fn debounce_delay(&self) -> Duration {
        Duration::from_millis(self.build.watch_timeout_ms.unwrap_or(self.build.debounce_ms))
    }

    /// Delay for the first trigger of a pass: immediate unless a watch timeout is set
    pub fn initial_delay(&self) -> Duration {
        Duration::from_millis(self.build.watch_timeout_ms.unwrap_or(0))
    }
}
