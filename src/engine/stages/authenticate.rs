//! Authenticate stage
//!
//! Points the devpi client at the server, then logs in:
//!
//! ```text
//! devpi use <server>
//! devpi login <username> --password <password>
//! ```

use std::time::Instant;

use tracing::instrument;

use super::conclude;
use crate::config::ExecutionContext;
use crate::engine::command::{CommandExecutor, CommandSpec};
use crate::engine::error::PipelineError;
use crate::engine::result::{Stage, StageResult};

/// Connect and log in; passes only if both commands succeed
#[instrument(skip_all, fields(server = %ctx.server, username = %ctx.username))]
pub async fn authenticate(exec: &CommandExecutor<'_>, ctx: &ExecutionContext) -> StageResult {
    exec.reporter().section("Testing login to devpi server...");
    let started = Instant::now();
    let outcome = login(exec, ctx).await;
    conclude(Stage::Authenticate, exec.reporter(), started, outcome)
}

async fn login(exec: &CommandExecutor<'_>, ctx: &ExecutionContext) -> Result<(), PipelineError> {
    let reporter = exec.reporter();

    let connect = CommandSpec::new(&ctx.tools.devpi)
        .args(["use", ctx.server.as_str()])
        .output_mode(ctx.output_mode);
    exec.run(&connect).await?;
    reporter.success(&format!("Connected to server: {}", ctx.server));

    let login = CommandSpec::new(&ctx.tools.devpi)
        .args(["login", ctx.username.as_str(), "--password"])
        .secret_arg(ctx.password.as_str())
        .output_mode(ctx.output_mode);
    exec.run(&login).await?;
    reporter.success(&format!("Successfully logged in as: {}", ctx.username));

    Ok(())
}
