//! Presentation Layer
//!
//! This layer handles:
//! - CLI argument parsing (via clap)
//! - Creating the build coordinator with infrastructure dependencies
//! - Output formatting (text/JSON)
//!
//! ## Structure
//!
//! - `cli` - Command line definition
//! - `factory` - Wires the coordinator (dependency injection)
//! - `output` - Console rendering of events and summaries

pub mod cli;
pub mod factory;
pub mod output;

pub use factory::{create_build_coordinator, create_event_sink, resolve_config};
