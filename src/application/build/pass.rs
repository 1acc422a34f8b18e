//! One build pass: snapshot -> stage -> aggregate -> commit
//!
//! Everything here runs while the caller holds the pass token. The context is
//! passed in by `&mut` and owned by this pass alone.

use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::domain::entities::{BuildContext, ComponentDescriptor, Diagnostic};
use crate::domain::ports::{BuildEvent, BuildEventSink, Snapshot};
use crate::domain::services::{generate_component_types_file, AppTypesOptions, GENERATED_DTS};
use crate::domain::value_objects::ContentHash;
use crate::infrastructure::vfs::{CommitResult, VirtualFs, WriteOptions};

/// What a pass works against
pub struct PassEnv<'a> {
    pub config: &'a Config,
    pub vfs: &'a VirtualFs,
    pub events: &'a dyn BuildEventSink,
}

/// Run a full pass over `snapshot`, leaving `ctx` ready to resolve
pub fn build(env: &PassEnv<'_>, ctx: &mut BuildContext, snapshot: Snapshot) -> CommitResult {
    let span = ctx.create_time_span("build started");

    tracing::debug!(
        pass = ctx.pass,
        version = snapshot.version,
        components = snapshot.components.len(),
        emitted = snapshot.emitted.len(),
        removed = snapshot.removed.len(),
        "snapshot received"
    );

    ctx.components = snapshot.components;
    ctx.extend_diagnostics(snapshot.diagnostics);
    for file in snapshot.emitted {
        env.vfs.stage_write(&file.path, file.content);
    }
    for path in snapshot.removed {
        env.vfs.stage_remove(&path);
    }

    generate_app_types(env, ctx);
    let result = write_build(env, ctx);

    span.finish(format!(
        "build finished, {} written, {} deleted",
        result.files_written.len(),
        result.files_deleted.len()
    ));
    result
}

/// Path of the source-tree artifact
pub fn source_types_path(config: &Config) -> PathBuf {
    config.src_dir().join(GENERATED_DTS)
}

/// Render the artifact as it would be written into `dir`
pub fn render_types(
    config: &Config,
    components: &[ComponentDescriptor],
    dir: &Path,
    internal: bool,
) -> String {
    let options = AppTypesOptions {
        import_base_dir: dir,
        runtime_module: &config.types.runtime_module,
        element_base: &config.types.element_base,
        are_types_internal: internal,
    };
    generate_component_types_file(components, &options)
}

/// Stage the artifact for the source tree and every extra destination
///
/// Returns whether the source-tree artifact differs from what is on disk.
pub fn generate_app_types(env: &PassEnv<'_>, ctx: &mut BuildContext) -> bool {
    let span = ctx.create_time_span("generating app types");

    let src_dir = env.config.src_dir();
    let changed = stage_types(env, ctx, &src_dir, true);
    ctx.components_dts_changed = changed;

    for dest in env.config.type_destinations() {
        stage_types(env, ctx, &dest, false);
    }

    span.finish(format!("generating app types finished, changed: {}", changed));
    changed
}

fn stage_types(env: &PassEnv<'_>, ctx: &mut BuildContext, dir: &Path, internal: bool) -> bool {
    let path = dir.join(GENERATED_DTS);
    let content = render_types(env.config, &ctx.components, dir, internal);
    let hash = ContentHash::from_content(&content);

    match env.vfs.write_file(&path, content, WriteOptions::default()) {
        Ok(written) => {
            tracing::debug!(
                path = %path.display(),
                hash = hash.short(),
                changed = written.changed_content,
                "declaration artifact staged"
            );
            env.events.on_event(BuildEvent::ArtifactGenerated {
                path,
                hash: hash.short().to_string(),
                changed: written.changed_content,
            });
            written.changed_content
        }
        Err(e) => {
            ctx.push_diagnostic(
                Diagnostic::error(format!("failed to stage declarations: {}", e)).with_file(path),
            );
            false
        }
    }
}

/// Commit the virtual filesystem and record what changed on `ctx`
pub fn write_build(env: &PassEnv<'_>, ctx: &mut BuildContext) -> CommitResult {
    let result = env.vfs.commit();

    ctx.files_written = result.files_written.clone();
    ctx.files_deleted = result.files_deleted.clone();
    ctx.dirs_added = result.dirs_added.clone();
    ctx.dirs_deleted = result.dirs_deleted.clone();

    let src_types = source_types_path(env.config);
    // The commit diff has the final say over whether the artifact changed.
    ctx.components_dts_changed = result.was_written(&src_types);

    for error in &result.errors {
        ctx.push_diagnostic(
            Diagnostic::error(format!("{} failed: {}", error.op, error.message))
                .with_file(&error.path),
        );
    }

    env.events.on_event(BuildEvent::Committed {
        pass: ctx.pass,
        written: result.files_written.len(),
        deleted: result.files_deleted.len(),
        dirs_added: result.dirs_added.len(),
        dirs_deleted: result.dirs_deleted.len(),
        errors: result.errors.len(),
    });
    result
}
