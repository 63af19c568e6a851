//! Retrieve & verify stage
//!
//! Installs the exact fixture version from the target index, then removes it
//! again so the environment is left as it was:
//!
//! ```text
//! python -m pip install --index-url <server>/<index>/+simple/ <name>==<version>
//! python -m pip uninstall -y <name>
//! ```
//!
//! The uninstall runs once after every install attempt, including a failed
//! one, since a failed install can still leave files behind. Its own result
//! never changes the stage result.

use std::time::Instant;

use tracing::{debug, instrument, warn};

use super::conclude;
use crate::config::ExecutionContext;
use crate::engine::command::{CommandExecutor, CommandSpec};
use crate::engine::error::PipelineError;
use crate::engine::result::{Stage, StageResult};

/// Install then uninstall the fixture; passes iff the install succeeds
#[instrument(skip_all, fields(requirement = %ctx.package.requirement()))]
pub async fn retrieve(exec: &CommandExecutor<'_>, ctx: &ExecutionContext) -> StageResult {
    exec.reporter()
        .section("Testing package download and installation...");
    let started = Instant::now();
    let outcome = install(exec, ctx).await;
    conclude(Stage::Retrieve, exec.reporter(), started, outcome)
}

async fn install(exec: &CommandExecutor<'_>, ctx: &ExecutionContext) -> Result<(), PipelineError> {
    let reporter = exec.reporter();
    let requirement = ctx.package.requirement();
    let index_url = ctx.index_url();

    reporter.info(&format!("  Installing {} from devpi...", requirement));
    let install = CommandSpec::new(&ctx.tools.python)
        .args(["-m", "pip", "install", "--index-url"])
        .arg(index_url)
        .arg(requirement.as_str())
        .output_mode(ctx.output_mode);
    let outcome = exec.run(&install).await;

    if outcome.is_ok() {
        reporter.success(&format!("Package {} installed successfully", requirement));
    }

    reporter.info("  Cleaning up test package...");
    uninstall(exec, ctx).await;

    outcome.map(|_| ())
}

async fn uninstall(exec: &CommandExecutor<'_>, ctx: &ExecutionContext) {
    let spec = CommandSpec::new(&ctx.tools.python)
        .args(["-m", "pip", "uninstall", "-y", ctx.package.name.as_str()])
        .output_mode(ctx.output_mode)
        .non_fatal();

    match exec.run(&spec).await {
        Ok(outcome) if outcome.success() => debug!("Uninstalled {}", ctx.package.name),
        Ok(outcome) => warn!(
            status = outcome.status,
            "Uninstall of {} exited non-zero", ctx.package.name
        ),
        Err(e) => warn!("Uninstall of {} failed: {}", ctx.package.name, e),
    }
}
