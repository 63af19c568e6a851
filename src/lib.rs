//! # devpi-smoke
//!
//! End-to-end smoke test for a devpi package server. Drives the `devpi`
//! client and the Python packaging toolchain as subprocesses through three
//! gated stages and reports pass/fail for each.
//!
//! ## Stages
//!
//! - **Authenticate** - `devpi use <server>` and `devpi login`
//! - **Publish** - `devpi use <index>`, clean build of the fixture, `devpi upload`
//! - **Retrieve** - `pip install name==version` from the index, then uninstall
//!
//! A stage only runs when the one before it passed; skipped stages count as
//! failures in the summary.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use devpi_smoke::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let ctx = ExecutionContext::new(
//!         "https://devpi.example.com",
//!         "alice",
//!         "secret",
//!         "alice/dev",
//!         PackageFixture::new("./test-package"),
//!     );
//!
//!     let runner = SystemRunner::new();
//!     let reporter = ConsoleReporter::new();
//!     let table = Pipeline::new(&runner, &reporter).run(&ctx).await?;
//!
//!     std::process::exit(table.exit_code().into());
//! }
//! ```

pub mod config;
pub mod engine;

// Re-export main types
pub use config::{
    ConfigError, ExecutionContext, PackageConfig, PackageFixture, SmokeConfig, ToolsConfig,
};
pub use engine::{
    CommandExecutor, CommandOutcome, CommandRunner, CommandSpec, OutputMode, Pipeline,
    PipelineError, ResultTable, Stage, StageResult, StageStatus, SystemRunner,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{ExecutionContext, PackageFixture, SmokeConfig, ToolsConfig};
    pub use crate::engine::{
        CaptureReporter, CommandRunner, ConsoleReporter, OutputMode, Pipeline, PipelineError,
        Reporter, ResultTable, SilentReporter, Stage, StageResult, StageStatus, SystemRunner,
    };
}
