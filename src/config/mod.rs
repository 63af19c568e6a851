//! Run configuration
//!
//! - `context` - ExecutionContext, the fixture package and tool locations
//! - `loader` - Optional YAML config file and package directory discovery

pub mod context;
pub mod loader;

pub use context::{ExecutionContext, PackageFixture, ToolsConfig, FIXTURE_NAME, FIXTURE_VERSION};
pub use loader::{discover_package_dir, ConfigError, PackageConfig, SmokeConfig, FIXTURE_DIR};
