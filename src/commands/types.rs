use std::sync::Arc;

use anyhow::Result;

use hobbes::domain::ports::NoopEventSink;
use hobbes::presentation::cli::ProjectArgs;
use hobbes::presentation::{create_build_coordinator, resolve_config};

pub fn cmd_types(project: &ProjectArgs) -> Result<()> {
    let cwd = std::env::current_dir()?;
    let (config, warnings) = resolve_config(project, &cwd)?;
    super::print_warnings(&warnings);

    let coordinator = create_build_coordinator(config, Arc::new(NoopEventSink));
    print!("{}", coordinator.preview_types()?);
    Ok(())
}
