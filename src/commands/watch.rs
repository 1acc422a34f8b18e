use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};

use hobbes::presentation::cli::ProjectArgs;
use hobbes::presentation::{create_build_coordinator, create_event_sink, resolve_config};

pub fn cmd_watch(project: &ProjectArgs, timeout: Option<u64>, json: bool, verbose: u8) -> Result<()> {
    let cwd = std::env::current_dir()?;
    let (mut config, warnings) = resolve_config(project, &cwd)?;
    super::print_warnings(&warnings);
    let json = json || config.output.json;
    if let Some(ms) = timeout {
        config.build.watch_timeout_ms = Some(ms);
    }

    // Set up Ctrl+C handler
    let running = Arc::new(AtomicBool::new(true));
    let running_clone = running.clone();
    ctrlc::set_handler(move || {
        running_clone.store(false, Ordering::SeqCst);
    })
    .context("failed to install Ctrl+C handler")?;

    let coordinator = create_build_coordinator(config, create_event_sink("watch", json, verbose));
    coordinator.watch(running)?;
    Ok(())
}
