//! Hobbes CLI - incremental build orchestration for component compilers
//!
//! Usage: hobbes <COMMAND>
//!
//! Commands:
//!   build   Run one full build and exit
//!   watch   Rebuild on every change until interrupted
//!   types   Print the generated components.d.ts

mod commands;

use anyhow::Result;
use clap::Parser;
use hobbes::presentation::cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Build { project } => commands::build::cmd_build(&project, cli.json, cli.verbose),
        Commands::Watch { project, timeout } => {
            commands::watch::cmd_watch(&project, timeout, cli.json, cli.verbose)
        }
        Commands::Types { project } => commands::types::cmd_types(&project),
    }
}

/// `HOBBES_LOG` wins over `-v`
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_env("HOBBES_LOG")
        .unwrap_or_else(|_| EnvFilter::new(format!("hobbes={}", level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}
