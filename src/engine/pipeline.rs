//! Pipeline controller
//!
//! Runs authenticate → publish → retrieve strictly in that order. A stage
//! only runs when the stage right before it passed; otherwise it is recorded
//! as skipped and none of its commands are issued. All three stages always
//! appear in the returned [`ResultTable`].

use chrono::Utc;
use tracing::{info, instrument, warn};

use crate::config::ExecutionContext;
use crate::engine::command::{CommandExecutor, CommandRunner};
use crate::engine::error::PipelineError;
use crate::engine::reporter::Reporter;
use crate::engine::result::{ResultTable, Stage, StageResult};
use crate::engine::stages;

const RULE_WIDTH: usize = 60;

pub struct Pipeline<'a> {
    runner: &'a dyn CommandRunner,
    reporter: &'a dyn Reporter,
}

impl<'a> Pipeline<'a> {
    pub fn new(runner: &'a dyn CommandRunner, reporter: &'a dyn Reporter) -> Self {
        Self { runner, reporter }
    }

    /// Run all three stages and print the summary
    ///
    /// Returns `PreconditionMissing` before any stage runs when the package
    /// directory does not exist.
    #[instrument(skip_all, fields(run_id = %ctx.run_id))]
    pub async fn run(&self, ctx: &ExecutionContext) -> Result<ResultTable, PipelineError> {
        if let Err(e) = ctx.ensure_package_dir() {
            self.reporter.failure(&e.to_string());
            return Err(e);
        }

        self.print_banner(ctx);
        let started_at = Utc::now();
        let exec = CommandExecutor::new(self.runner, self.reporter);

        let authenticated = stages::authenticate(&exec, ctx).await;
        self.reporter.info("");

        let published = if authenticated.success() {
            stages::publish(&exec, ctx).await
        } else {
            self.skip(Stage::Publish, Stage::Authenticate)
        };
        self.reporter.info("");

        let retrieved = if published.success() {
            stages::retrieve(&exec, ctx).await
        } else {
            self.skip(Stage::Retrieve, Stage::Publish)
        };
        self.reporter.info("");

        let table = ResultTable::new(
            ctx.run_id.clone(),
            started_at,
            authenticated,
            published,
            retrieved,
        );
        info!(success = table.success(), "Pipeline finished");

        self.print_summary(&table);
        Ok(table)
    }

    fn skip(&self, stage: Stage, blocked_by: Stage) -> StageResult {
        warn!(stage = %stage, blocked_by = %blocked_by, "Skipping stage");
        self.reporter.skip(&format!(
            "Skipping {} stage due to {} failure",
            stage, blocked_by
        ));
        StageResult::skipped(stage)
    }

    fn print_banner(&self, ctx: &ExecutionContext) {
        let rule = "=".repeat(RULE_WIDTH);
        self.reporter.info(&rule);
        self.reporter.info(&format!("Server: {}", ctx.server));
        self.reporter.info(&format!("Username: {}", ctx.username));
        self.reporter.info(&format!("Index: {}", ctx.index));
        self.reporter.info(&format!(
            "Package: {} v{}",
            ctx.package.name, ctx.package.version
        ));
        self.reporter.info(&rule);
        self.reporter.info("");
    }

    fn print_summary(&self, table: &ResultTable) {
        let rule = "=".repeat(RULE_WIDTH);
        self.reporter.info(&rule);
        self.reporter.section("Stage Summary");
        self.reporter.info(&rule);

        for result in table.iter() {
            self.reporter
                .stage_status(result.stage.title(), result.success());
        }

        self.reporter.info(&rule);
        self.reporter.info("");

        if table.success() {
            self.reporter.success("All stages passed!");
        } else {
            self.reporter.failure("Some stages failed");
        }
    }
}
