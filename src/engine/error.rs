//! Pipeline error types

use std::path::PathBuf;

/// Errors that can occur while running the smoke pipeline
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Command `{command}` failed with exit code {status}")]
    CommandFailed {
        command: String,
        status: i32,
        stderr: String,
    },

    #[error("Failed to execute {program}: {reason}")]
    Spawn { program: String, reason: String },

    #[error("Package directory not found: {}", .0.display())]
    PreconditionMissing(PathBuf),
}

impl PipelineError {
    /// Diagnostic text recorded on a failed stage
    pub fn diagnostic(&self) -> String {
        match self {
            PipelineError::CommandFailed { stderr, .. } if !stderr.trim().is_empty() => {
                stderr.trim().to_string()
            }
            other => other.to_string(),
        }
    }
}
