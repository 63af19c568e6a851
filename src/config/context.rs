//! Execution context for a smoke run
//!
//! Everything a stage needs to know about the run: where the server is, who
//! to log in as, which index to publish into, and which fixture package to
//! push through it. Built once from the CLI and config file, then only read.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::engine::command::OutputMode;
use crate::engine::error::PipelineError;

pub const FIXTURE_NAME: &str = "hello-devpi-test";
pub const FIXTURE_VERSION: &str = "0.0.1";

/// External executables driven by the stages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// devpi client
    #[serde(default = "default_devpi")]
    pub devpi: String,

    /// Interpreter used for `setup.py` and `-m pip`
    #[serde(default = "default_python")]
    pub python: String,
}

fn default_devpi() -> String {
    "devpi".to_string()
}

fn default_python() -> String {
    "python".to_string()
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            devpi: default_devpi(),
            python: default_python(),
        }
    }
}

/// The package pushed through the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageFixture {
    pub dir: PathBuf,
    pub name: String,
    pub version: String,
}

impl PackageFixture {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            name: FIXTURE_NAME.to_string(),
            version: FIXTURE_VERSION.to_string(),
        }
    }

    /// `name==version`
    pub fn requirement(&self) -> String {
        format!("{}=={}", self.name, self.version)
    }
}

/// Immutable inputs of one run
#[derive(Clone)]
pub struct ExecutionContext {
    pub server: String,
    pub username: String,
    /// Passed to the client as an argument, never logged
    pub password: String,
    pub index: String,
    pub package: PackageFixture,
    pub tools: ToolsConfig,
    pub output_mode: OutputMode,
    pub run_id: String,
}

impl ExecutionContext {
    pub fn new(
        server: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
        index: impl Into<String>,
        package: PackageFixture,
    ) -> Self {
        Self {
            server: server.into(),
            username: username.into(),
            password: password.into(),
            index: index.into(),
            package,
            tools: ToolsConfig::default(),
            output_mode: OutputMode::Capture,
            run_id: uuid::Uuid::new_v4().to_string(),
        }
    }

    pub fn with_tools(mut self, tools: ToolsConfig) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_output_mode(mut self, mode: OutputMode) -> Self {
        self.output_mode = mode;
        self
    }

    pub fn package_dir(&self) -> &Path {
        &self.package.dir
    }

    /// Simple-API URL of the target index, so pip installs what was just uploaded
    pub fn index_url(&self) -> String {
        format!(
            "{}/{}/+simple/",
            self.server.trim_end_matches('/'),
            self.index.trim_matches('/')
        )
    }

    /// Fails when the package directory is missing
    pub fn ensure_package_dir(&self) -> Result<(), PipelineError> {
        if self.package.dir.is_dir() {
            Ok(())
        } else {
            Err(PipelineError::PreconditionMissing(self.package.dir.clone()))
        }
    }
}

impl fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("server", &self.server)
            .field("username", &self.username)
            .field("password", &"********")
            .field("index", &self.index)
            .field("package", &self.package)
            .field("tools", &self.tools)
            .field("output_mode", &self.output_mode)
            .field("run_id", &self.run_id)
            .finish()
    }
}
