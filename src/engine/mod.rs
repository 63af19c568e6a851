//! Smoke pipeline engine
//!
//! This module contains:
//! - `command` - External command specs, runners and the command executor
//! - `error` - Pipeline error types
//! - `result` - Stage and run result types
//! - `reporter` - User-facing output abstraction
//! - `stages` - The authenticate, publish and retrieve stages
//! - `pipeline` - The gated stage sequence
//! - `fakes` - Scripted command runner for tests

pub mod command;
pub mod error;
pub mod fakes;
pub mod pipeline;
pub mod reporter;
pub mod result;
pub mod stages;

pub use command::{CommandExecutor, CommandOutcome, CommandRunner, CommandSpec, OutputMode, SystemRunner};
pub use error::PipelineError;
pub use fakes::{FakeRunner, RecordedCall};
pub use pipeline::Pipeline;
pub use reporter::{CaptureReporter, ConsoleReporter, ReportLine, Reporter, SilentReporter};
pub use result::{ResultTable, Stage, StageResult, StageStatus};
