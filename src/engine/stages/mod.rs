//! Stage implementations
//!
//! Each stage is a short sequence of external commands. Command errors are
//! caught here, at the stage boundary, and turned into a failed
//! [`StageResult`]; nothing past this module sees a `PipelineError` from a
//! stage.

pub mod authenticate;
pub mod publish;
pub mod retrieve;

pub use authenticate::authenticate;
pub use publish::{publish, purge_build_artifacts};
pub use retrieve::retrieve;

use std::time::Instant;

use tracing::{error, info};

use crate::engine::error::PipelineError;
use crate::engine::reporter::Reporter;
use crate::engine::result::{Stage, StageResult};

fn conclude(
    stage: Stage,
    reporter: &dyn Reporter,
    started: Instant,
    outcome: Result<(), PipelineError>,
) -> StageResult {
    let duration_ms = started.elapsed().as_millis() as u64;

    match outcome {
        Ok(()) => {
            info!(stage = %stage, duration_ms, "Stage passed");
            StageResult::passed(stage, duration_ms)
        }
        Err(e) => {
            error!(stage = %stage, duration_ms, "Stage failed: {}", e);
            reporter.failure(&format!("{} stage failed", stage.title()));
            StageResult::failed(stage, e.diagnostic(), duration_ms)
        }
    }
}
