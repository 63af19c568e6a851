#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use devpi_smoke::{ExecutionContext, PackageFixture};
use tempfile::TempDir;

pub const SERVER: &str = "https://devpi.example.com";
pub const USERNAME: &str = "testuser";
pub const PASSWORD: &str = "testpass";
pub const INDEX: &str = "testuser/dev";

pub fn create_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp directory")
}

/// A package source directory with a minimal setup.py
pub fn write_package_dir(dir: &Path) -> PathBuf {
    let pkg = dir.join("test-package");
    fs::create_dir_all(&pkg).expect("Failed to create package directory");
    fs::write(
        pkg.join("setup.py"),
        "from setuptools import setup\nsetup(name='hello-devpi-test', version='0.0.1')\n",
    )
    .expect("Failed to write setup.py");
    pkg
}

pub fn write_config(dir: &Path, content: &str) -> PathBuf {
    let path = dir.join("smoke.yaml");
    fs::write(&path, content).expect("Failed to write smoke.yaml");
    path
}

pub fn context(package_dir: &Path) -> ExecutionContext {
    ExecutionContext::new(
        SERVER,
        USERNAME,
        PASSWORD,
        INDEX,
        PackageFixture::new(package_dir),
    )
}

/// Write an executable shell script
#[cfg(unix)]
pub fn write_stub(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{}", body)).expect("Failed to write stub");
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755))
        .expect("Failed to make stub executable");
    path
}

/// Stub `devpi` that appends its arguments to `log` and accepts only
/// `PASSWORD` on login
#[cfg(unix)]
pub fn devpi_stub(dir: &Path, log: &Path) -> PathBuf {
    write_stub(
        dir,
        "devpi",
        &format!(
            r#"echo "devpi $*" >> "{log}"
if [ "$1" = "login" ] && [ "$4" != "{password}" ]; then
  echo "401 Unauthorized" >&2
  exit 1
fi
exit 0
"#,
            log = log.display(),
            password = PASSWORD,
        ),
    )
}

/// Stub `python` that appends its arguments to `log` and exits with
/// `install_status` for `-m pip install`
#[cfg(unix)]
pub fn python_stub(dir: &Path, log: &Path, install_status: i32) -> PathBuf {
    write_stub(
        dir,
        "python",
        &format!(
            r#"echo "python $*" >> "{log}"
if [ "$1" = "-m" ] && [ "$3" = "install" ]; then
  if [ {status} -ne 0 ]; then
    echo "ERROR: No matching distribution found" >&2
  fi
  exit {status}
fi
exit 0
"#,
            log = log.display(),
            status = install_status,
        ),
    )
}

pub fn read_log(log: &Path) -> Vec<String> {
    fs::read_to_string(log)
        .unwrap_or_default()
        .lines()
        .map(String::from)
        .collect()
}
