//! Configuration module for Hobbes
//!
//! Configuration hierarchy:
//! 1. CLI flags (highest priority)
//! 2. Environment variables (HOBBES_*)
//! 3. Project config (hobbes.toml)
//! 4. Built-in defaults (lowest priority)

mod loader;
mod types;

pub use crate::domain::value_objects::ConfigWarning;

pub use types::{BuildConfig, Config, OutputConfig, TypesConfig, CONFIG_FILE};
