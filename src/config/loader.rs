//! Config file loading and package directory discovery
//!
//! The optional YAML file only overrides tool locations and the fixture;
//! server, credentials and index always come from the command line.
//!
//! ```yaml
//! tools:
//!   devpi: /opt/venv/bin/devpi
//!   python: /opt/venv/bin/python
//! package:
//!   dir: ./test-package
//!   name: hello-devpi-test
//!   version: 0.0.1
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::context::{PackageFixture, ToolsConfig, FIXTURE_NAME, FIXTURE_VERSION};

pub const FIXTURE_DIR: &str = "test-package";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error in {file}: {error}")]
    Yaml {
        file: String,
        error: serde_yaml::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageConfig {
    /// Package source directory; relative paths resolve against the config file
    #[serde(default)]
    pub dir: Option<PathBuf>,

    #[serde(default = "default_name")]
    pub name: String,

    #[serde(default = "default_version")]
    pub version: String,
}

fn default_name() -> String {
    FIXTURE_NAME.to_string()
}

fn default_version() -> String {
    FIXTURE_VERSION.to_string()
}

impl Default for PackageConfig {
    fn default() -> Self {
        Self {
            dir: None,
            name: default_name(),
            version: default_version(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmokeConfig {
    #[serde(default)]
    pub tools: ToolsConfig,

    #[serde(default)]
    pub package: PackageConfig,
}

impl SmokeConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let mut config: SmokeConfig =
            serde_yaml::from_str(&content).map_err(|e| ConfigError::Yaml {
                file: path.display().to_string(),
                error: e,
            })?;

        if let Some(dir) = &config.package.dir {
            if dir.is_relative() {
                let base = path.parent().unwrap_or_else(|| Path::new("."));
                config.package.dir = Some(base.join(dir));
            }
        }

        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Build the fixture, preferring an explicit directory over the config
    /// file and the config file over discovery
    pub fn fixture(&self, dir_override: Option<PathBuf>) -> PackageFixture {
        let dir = dir_override
            .or_else(|| self.package.dir.clone())
            .unwrap_or_else(discover_package_dir);

        PackageFixture {
            dir,
            name: self.package.name.clone(),
            version: self.package.version.clone(),
        }
    }
}

/// `test-package` next to the running executable, else under the working directory
pub fn discover_package_dir() -> PathBuf {
    let beside_exe = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|p| p.join(FIXTURE_DIR)));

    match beside_exe {
        Some(dir) if dir.is_dir() => dir,
        _ => PathBuf::from(FIXTURE_DIR),
    }
}
