//! External command execution
//!
//! Every stage talks to the outside world through [`CommandExecutor`], which
//! echoes the command through the [`Reporter`], hands it to a
//! [`CommandRunner`] and classifies the outcome by exit status.
//!
//! ```rust,no_run
//! use devpi_smoke::engine::{CommandExecutor, CommandSpec, ConsoleReporter, SystemRunner};
//!
//! # async fn demo() -> Result<(), devpi_smoke::PipelineError> {
//! let runner = SystemRunner::new();
//! let reporter = ConsoleReporter::new();
//! let executor = CommandExecutor::new(&runner, &reporter);
//!
//! let outcome = executor
//!     .run(&CommandSpec::new("devpi").arg("use").arg("https://devpi.example.com"))
//!     .await?;
//! assert!(outcome.success());
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Instant;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, instrument};

use crate::engine::error::PipelineError;
use crate::engine::reporter::Reporter;

const REDACTED: &str = "********";

/// Where the child's stdout/stderr go
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Pipe both streams and return them in the outcome
    #[default]
    Capture,
    /// Let the child write straight to our own stdout/stderr
    Inherit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CommandArg {
    value: String,
    secret: bool,
}

/// A single external command: program, arguments and execution root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    program: String,
    args: Vec<CommandArg>,
    current_dir: Option<PathBuf>,
    mode: OutputMode,
    check: bool,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            current_dir: None,
            mode: OutputMode::Capture,
            check: true,
        }
    }

    pub fn arg(mut self, value: impl Into<String>) -> Self {
        self.args.push(CommandArg {
            value: value.into(),
            secret: false,
        });
        self
    }

    pub fn args<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for value in values {
            self = self.arg(value);
        }
        self
    }

    /// Add an argument that is passed through but masked in every echo
    pub fn secret_arg(mut self, value: impl Into<String>) -> Self {
        self.args.push(CommandArg {
            value: value.into(),
            secret: true,
        });
        self
    }

    /// Run the command inside `dir` instead of the caller's working directory
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    pub fn output_mode(mut self, mode: OutputMode) -> Self {
        self.mode = mode;
        self
    }

    /// Return the outcome even when the command exits non-zero
    pub fn non_fatal(mut self) -> Self {
        self.check = false;
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Real argument values, in order
    pub fn argv(&self) -> Vec<&str> {
        self.args.iter().map(|a| a.value.as_str()).collect()
    }

    pub fn working_dir(&self) -> Option<&Path> {
        self.current_dir.as_deref()
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    pub fn is_checked(&self) -> bool {
        self.check
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            if arg.secret {
                write!(f, " {}", REDACTED)?;
            } else {
                write!(f, " {}", arg.value)?;
            }
        }
        Ok(())
    }
}

/// Exit status and captured output of one invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutcome {
    pub status: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutcome {
    pub fn success(&self) -> bool {
        self.status == 0
    }
}

/// Runs a command to completion
///
/// Implementations only spawn and wait; exit-status policy lives in
/// [`CommandExecutor`].
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, spec: &CommandSpec) -> Result<CommandOutcome, PipelineError>;
}

/// Spawns real child processes via `tokio::process`
#[derive(Debug, Default, Clone)]
pub struct SystemRunner;

impl SystemRunner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CommandRunner for SystemRunner {
    #[instrument(skip(self, spec), fields(program = %spec.program))]
    async fn run(&self, spec: &CommandSpec) -> Result<CommandOutcome, PipelineError> {
        // Resolve against our own cwd before current_dir applies to the child
        let program = which::which(&spec.program).map_err(|e| PipelineError::Spawn {
            program: spec.program.clone(),
            reason: e.to_string(),
        })?;
        debug!("Resolved {} to {}", spec.program, program.display());

        let mut cmd = Command::new(&program);
        cmd.args(spec.argv());
        cmd.stdin(Stdio::null());

        if let Some(dir) = &spec.current_dir {
            cmd.current_dir(dir);
        }

        let spawn_error = |e: std::io::Error| PipelineError::Spawn {
            program: spec.program.clone(),
            reason: e.to_string(),
        };

        let start = Instant::now();
        // output() always pipes both streams, so inherited runs only wait on status
        let (exit, stdout, stderr) = match spec.mode {
            OutputMode::Capture => {
                cmd.stdout(Stdio::piped());
                cmd.stderr(Stdio::piped());
                let output = cmd.output().await.map_err(spawn_error)?;
                (
                    output.status,
                    String::from_utf8_lossy(&output.stdout).to_string(),
                    String::from_utf8_lossy(&output.stderr).to_string(),
                )
            }
            OutputMode::Inherit => {
                cmd.stdout(Stdio::inherit());
                cmd.stderr(Stdio::inherit());
                let status = cmd.status().await.map_err(spawn_error)?;
                (status, String::new(), String::new())
            }
        };

        let status = exit.code().unwrap_or(-1);
        debug!(
            status,
            duration_ms = start.elapsed().as_millis() as u64,
            "Command exited"
        );

        Ok(CommandOutcome {
            status,
            stdout,
            stderr,
        })
    }
}

/// Echoes, runs and checks commands on behalf of the stages
pub struct CommandExecutor<'a> {
    runner: &'a dyn CommandRunner,
    reporter: &'a dyn Reporter,
}

impl<'a> CommandExecutor<'a> {
    pub fn new(runner: &'a dyn CommandRunner, reporter: &'a dyn Reporter) -> Self {
        Self { runner, reporter }
    }

    pub fn reporter(&self) -> &'a dyn Reporter {
        self.reporter
    }

    /// Run `spec` to completion
    ///
    /// A non-zero exit becomes [`PipelineError::CommandFailed`] unless the
    /// spec was marked [`CommandSpec::non_fatal`].
    pub async fn run(&self, spec: &CommandSpec) -> Result<CommandOutcome, PipelineError> {
        self.reporter.command(&spec.to_string());

        let outcome = match self.runner.run(spec).await {
            Ok(outcome) => outcome,
            Err(e) => {
                if spec.check {
                    self.reporter.failure(&e.to_string());
                }
                return Err(e);
            }
        };

        if spec.check && !outcome.success() {
            self.reporter.failure(&format!(
                "Command failed with exit code {}",
                outcome.status
            ));
            if !outcome.stderr.trim().is_empty() {
                self.reporter
                    .detail(&format!("stderr: {}", outcome.stderr.trim_end()));
            }
            if !outcome.stdout.trim().is_empty() {
                self.reporter
                    .detail(&format!("stdout: {}", outcome.stdout.trim_end()));
            }
            return Err(PipelineError::CommandFailed {
                command: spec.to_string(),
                status: outcome.status,
                stderr: outcome.stderr,
            });
        }

        Ok(outcome)
    }
}
