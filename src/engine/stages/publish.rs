//! Publish stage
//!
//! Selects the target index, rebuilds the fixture package from a clean tree
//! and uploads it:
//!
//! ```text
//! devpi use <index>
//! python setup.py sdist bdist_wheel   (in the package directory)
//! devpi upload                        (in the package directory)
//! ```
//!
//! The package directory is handed to each command as its execution root;
//! the process working directory is never touched.

use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{debug, instrument, warn};

use super::conclude;
use crate::config::ExecutionContext;
use crate::engine::command::{CommandExecutor, CommandSpec};
use crate::engine::error::PipelineError;
use crate::engine::result::{Stage, StageResult};

const ARTIFACT_DIRS: [&str; 2] = ["build", "dist"];
const EGG_INFO_SUFFIX: &str = ".egg-info";

/// Build and upload the fixture; passes only if build and upload succeed
#[instrument(skip_all, fields(index = %ctx.index, package_dir = %ctx.package_dir().display()))]
pub async fn publish(exec: &CommandExecutor<'_>, ctx: &ExecutionContext) -> StageResult {
    exec.reporter().section("Testing package upload...");
    let started = Instant::now();
    let outcome = upload(exec, ctx).await;
    conclude(Stage::Publish, exec.reporter(), started, outcome)
}

async fn upload(exec: &CommandExecutor<'_>, ctx: &ExecutionContext) -> Result<(), PipelineError> {
    let reporter = exec.reporter();
    let root = ctx.package_dir();

    let select = CommandSpec::new(&ctx.tools.devpi)
        .args(["use", ctx.index.as_str()])
        .output_mode(ctx.output_mode);
    exec.run(&select).await?;
    reporter.success(&format!("Using index: {}", ctx.index));

    let removed = purge_build_artifacts(root).await;
    if !removed.is_empty() {
        reporter.info(&format!("  Removed {} stale build artifact(s)", removed.len()));
    }

    let build = CommandSpec::new(&ctx.tools.python)
        .args(["setup.py", "sdist", "bdist_wheel"])
        .current_dir(root)
        .output_mode(ctx.output_mode);
    exec.run(&build).await?;
    reporter.success("Package built successfully");

    let upload = CommandSpec::new(&ctx.tools.devpi)
        .arg("upload")
        .current_dir(root)
        .output_mode(ctx.output_mode);
    exec.run(&upload).await?;
    reporter.success("Package uploaded successfully");

    Ok(())
}

fn is_build_artifact(name: &str) -> bool {
    ARTIFACT_DIRS.contains(&name) || name.ends_with(EGG_INFO_SUFFIX)
}

/// Delete `build/`, `dist/` and `*.egg-info` under `dir`
///
/// Deletion errors are logged and otherwise ignored. Returns what was removed.
pub async fn purge_build_artifacts(dir: &Path) -> Vec<PathBuf> {
    let mut removed = Vec::new();

    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) => {
            warn!("Cannot list {}: {}", dir.display(), e);
            return removed;
        }
    };

    loop {
        let entry = match entries.next_entry().await {
            Ok(Some(entry)) => entry,
            Ok(None) => break,
            Err(e) => {
                warn!("Cannot read entry in {}: {}", dir.display(), e);
                break;
            }
        };

        let name = entry.file_name();
        if !is_build_artifact(&name.to_string_lossy()) {
            continue;
        }

        let path = entry.path();
        let result = match entry.file_type().await {
            Ok(ft) if ft.is_dir() => tokio::fs::remove_dir_all(&path).await,
            _ => tokio::fs::remove_file(&path).await,
        };

        match result {
            Ok(()) => {
                debug!("Removed {}", path.display());
                removed.push(path);
            }
            Err(e) => warn!("Failed to remove {}: {}", path.display(), e),
        }
    }

    removed.sort();
    removed
}
