mod common;

use std::path::PathBuf;

use common::*;
use devpi_smoke::config::{ConfigError, SmokeConfig};

#[test]
fn test_default_smoke_config() {
    let config = SmokeConfig::default();
    assert_eq!(config.tools.devpi, "devpi");
    assert_eq!(config.tools.python, "python");
    assert_eq!(config.package.name, "hello-devpi-test");
    assert_eq!(config.package.version, "0.0.1");
}

#[test]
fn test_load_empty_config() {
    let dir = create_test_dir();
    let path = write_config(dir.path(), "{}");

    let config = SmokeConfig::load(&path).unwrap();
    assert_eq!(config, SmokeConfig::default());
}

#[test]
fn test_load_full_config() {
    let dir = create_test_dir();
    let path = write_config(
        dir.path(),
        r#"
tools:
  devpi: /opt/venv/bin/devpi
  python: /opt/venv/bin/python
package:
  dir: /srv/fixtures/pkg
  name: other-package
  version: 1.2.3
"#,
    );

    let config = SmokeConfig::load(&path).unwrap();
    assert_eq!(config.tools.devpi, "/opt/venv/bin/devpi");
    assert_eq!(config.tools.python, "/opt/venv/bin/python");
    assert_eq!(config.package.dir, Some(PathBuf::from("/srv/fixtures/pkg")));

    let fixture = config.fixture(None);
    assert_eq!(fixture.requirement(), "other-package==1.2.3");
}

#[test]
fn test_relative_package_dir_follows_config_location() {
    let dir = create_test_dir();
    let pkg = write_package_dir(dir.path());
    let path = write_config(dir.path(), "package:\n  dir: test-package\n");

    let config = SmokeConfig::load(&path).unwrap();
    let fixture = config.fixture(None);

    assert_eq!(fixture.dir, pkg);
    assert!(fixture.dir.is_dir());
}

#[test]
fn test_cli_dir_beats_config_dir() {
    let dir = create_test_dir();
    let path = write_config(dir.path(), "package:\n  dir: from-config\n");

    let config = SmokeConfig::load(&path).unwrap();
    let fixture = config.fixture(Some(PathBuf::from("/from/cli")));

    assert_eq!(fixture.dir, PathBuf::from("/from/cli"));
}

#[test]
fn test_missing_config_file() {
    let dir = create_test_dir();
    let err = SmokeConfig::load(dir.path().join("absent.yaml")).unwrap_err();
    assert!(matches!(err, ConfigError::Io(_)));
}

#[test]
fn test_invalid_yaml_names_file() {
    let dir = create_test_dir();
    let path = write_config(dir.path(), "tools:\n  devpi: [unclosed\n");

    let err = SmokeConfig::load(&path).unwrap_err();
    match err {
        ConfigError::Yaml { file, .. } => assert!(file.ends_with("smoke.yaml")),
        other => panic!("expected YAML error, got {other}"),
    }
}
