//! Scripted command runner for tests
//!
//! `FakeRunner` never spawns anything. Every call is recorded, and the
//! outcome is chosen by the first rule whose prefix matches the command line
//! (`program arg1 arg2 ...`, with secrets unmasked). Unmatched commands
//! succeed with empty output.

use std::path::PathBuf;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::engine::command::{CommandOutcome, CommandRunner, CommandSpec};
use crate::engine::error::PipelineError;

/// A command as the fake saw it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub program: String,
    pub args: Vec<String>,
    pub current_dir: Option<PathBuf>,
}

impl RecordedCall {
    pub fn line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[derive(Debug, Clone)]
enum Response {
    Exit { status: i32, stderr: String },
    SpawnError(String),
}

#[derive(Debug, Default)]
pub struct FakeRunner {
    rules: Mutex<Vec<(String, Response)>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commands starting with `prefix` exit with `status` and `stderr`
    pub fn fail_when(self, prefix: &str, status: i32, stderr: &str) -> Self {
        self.push_rule(
            prefix,
            Response::Exit {
                status,
                stderr: stderr.to_string(),
            },
        );
        self
    }

    /// Commands starting with `prefix` cannot be spawned
    pub fn missing_program(self, prefix: &str) -> Self {
        self.push_rule(prefix, Response::SpawnError("not found".to_string()));
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Command lines of every recorded call
    pub fn lines(&self) -> Vec<String> {
        self.calls().iter().map(RecordedCall::line).collect()
    }

    /// How many recorded calls start with `prefix`
    pub fn count(&self, prefix: &str) -> usize {
        self.lines().iter().filter(|l| l.starts_with(prefix)).count()
    }

    fn push_rule(&self, prefix: &str, response: Response) {
        if let Ok(mut rules) = self.rules.lock() {
            rules.push((prefix.to_string(), response));
        }
    }
}

#[async_trait]
impl CommandRunner for FakeRunner {
    async fn run(&self, spec: &CommandSpec) -> Result<CommandOutcome, PipelineError> {
        let call = RecordedCall {
            program: spec.program().to_string(),
            args: spec.argv().into_iter().map(String::from).collect(),
            current_dir: spec.working_dir().map(PathBuf::from),
        };
        let line = call.line();

        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }

        let response = self.rules.lock().ok().and_then(|rules| {
            rules
                .iter()
                .find(|(prefix, _)| line.starts_with(prefix.as_str()))
                .map(|(_, r)| r.clone())
        });

        match response {
            Some(Response::Exit { status, stderr }) => Ok(CommandOutcome {
                status,
                stdout: String::new(),
                stderr,
            }),
            Some(Response::SpawnError(reason)) => Err(PipelineError::Spawn {
                program: spec.program().to_string(),
                reason,
            }),
            None => Ok(CommandOutcome {
                status: 0,
                stdout: String::new(),
                stderr: String::new(),
            }),
        }
    }
}
