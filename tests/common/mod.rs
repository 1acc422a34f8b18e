//! Common test utilities for hobbes integration tests.
//!
//! This module provides:
//! - `TestProject`: an isolated project directory with a `hobbes` runner
//! - `RecordingSink`: a build event sink that keeps every event
//! - Fixtures: component manifests and config files

#![allow(dead_code)]

pub mod env;
pub mod fixtures;

pub use env::*;
pub use fixtures::*;
