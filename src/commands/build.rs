use anyhow::Result;

use hobbes::presentation::cli::ProjectArgs;
use hobbes::presentation::output::{build_summary_json, render_build_summary, Icons};
use hobbes::presentation::{create_build_coordinator, create_event_sink, resolve_config};

pub fn cmd_build(project: &ProjectArgs, json: bool, verbose: u8) -> Result<()> {
    let cwd = std::env::current_dir()?;
    let (config, warnings) = resolve_config(project, &cwd)?;
    super::print_warnings(&warnings);
    let json = json || config.output.json;

    let root = config.root_dir().to_path_buf();
    let coordinator = create_build_coordinator(config, create_event_sink("build", json, verbose));
    let ctx = coordinator.run_full_build()?.wait()?;

    if json {
        println!("{}", build_summary_json(&ctx));
    } else {
        print!("{}", render_build_summary(&ctx, &root, &Icons::detect()));
    }

    if ctx.has_error() {
        std::process::exit(1);
    }
    Ok(())
}
