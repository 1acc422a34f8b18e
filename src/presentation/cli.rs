//! CLI Argument Parsing
//!
//! This module defines the CLI interface using clap.
//!
//! Global flags (--json, --verbose) are inherited by all subcommands.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Hobbes - incremental build orchestration for component compilers
#[derive(Parser, Debug)]
#[command(name = "hobbes")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Emit NDJSON events instead of text
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Where the project lives
#[derive(Args, Debug, Clone)]
pub struct ProjectArgs {
    /// Project root [default: .]
    #[arg(short, long)]
    pub root: Option<PathBuf>,

    /// Config file (defaults to <root>/hobbes.toml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run one full build and exit
    Build {
        #[command(flatten)]
        project: ProjectArgs,
    },

    /// Rebuild on every change until interrupted
    Watch {
        #[command(flatten)]
        project: ProjectArgs,

        /// Debounce override in milliseconds (0 still fires asynchronously)
        #[arg(long, value_name = "MS")]
        timeout: Option<u64>,
    },

    /// Print the generated components.d.ts without writing anything
    Types {
        #[command(flatten)]
        project: ProjectArgs,
    },
}
