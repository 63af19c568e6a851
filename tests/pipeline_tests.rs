mod common;

use common::*;
use devpi_smoke::engine::{CaptureReporter, FakeRunner, ReportLine, SilentReporter};
use devpi_smoke::{Pipeline, PipelineError, Stage, StageStatus};

fn statuses(table: &devpi_smoke::ResultTable) -> Vec<StageStatus> {
    table.iter().map(|r| r.status).collect()
}

#[tokio::test]
async fn test_valid_run_passes_every_stage() {
    let dir = create_test_dir();
    let pkg = write_package_dir(dir.path());
    let runner = FakeRunner::new();

    let table = Pipeline::new(&runner, &SilentReporter)
        .run(&context(&pkg))
        .await
        .unwrap();

    assert_eq!(
        statuses(&table),
        vec![StageStatus::Passed, StageStatus::Passed, StageStatus::Passed]
    );
    assert_eq!(table.exit_code(), 0);
    assert_eq!(
        runner.lines(),
        vec![
            "devpi use https://devpi.example.com",
            "devpi login testuser --password testpass",
            "devpi use testuser/dev",
            "python setup.py sdist bdist_wheel",
            "devpi upload",
            "python -m pip install --index-url https://devpi.example.com/testuser/dev/+simple/ hello-devpi-test==0.0.1",
            "python -m pip uninstall -y hello-devpi-test",
        ]
    );
}

#[tokio::test]
async fn test_invalid_credentials_skip_downstream() {
    let dir = create_test_dir();
    let pkg = write_package_dir(dir.path());
    let runner = FakeRunner::new().fail_when("devpi login", 1, "401 Unauthorized");

    let table = Pipeline::new(&runner, &SilentReporter)
        .run(&context(&pkg))
        .await
        .unwrap();

    assert_eq!(
        statuses(&table),
        vec![StageStatus::Failed, StageStatus::Skipped, StageStatus::Skipped]
    );
    assert_eq!(table.exit_code(), 1);
    // Nothing after the failed login was attempted
    assert_eq!(runner.calls().len(), 2);
    assert!(table.get(Stage::Publish).diagnostic.is_none());
    assert!(table.get(Stage::Retrieve).diagnostic.is_none());
}

#[tokio::test]
async fn test_build_failure_skips_retrieve() {
    let dir = create_test_dir();
    let pkg = write_package_dir(dir.path());
    let cwd_before = std::env::current_dir().unwrap();
    let runner = FakeRunner::new().fail_when("python setup.py", 1, "error: bdist_wheel");

    let table = Pipeline::new(&runner, &SilentReporter)
        .run(&context(&pkg))
        .await
        .unwrap();

    assert_eq!(
        statuses(&table),
        vec![StageStatus::Passed, StageStatus::Failed, StageStatus::Skipped]
    );
    assert_eq!(table.exit_code(), 1);
    assert_eq!(runner.count("devpi upload"), 0);
    assert_eq!(runner.count("python -m pip"), 0);
    assert_eq!(std::env::current_dir().unwrap(), cwd_before);
}

#[tokio::test]
async fn test_missing_artifact_fails_retrieve_and_cleans_up() {
    let dir = create_test_dir();
    let pkg = write_package_dir(dir.path());
    let runner = FakeRunner::new().fail_when(
        "python -m pip install",
        1,
        "ERROR: No matching distribution found for hello-devpi-test==0.0.1",
    );

    let table = Pipeline::new(&runner, &SilentReporter)
        .run(&context(&pkg))
        .await
        .unwrap();

    assert_eq!(
        statuses(&table),
        vec![StageStatus::Passed, StageStatus::Passed, StageStatus::Failed]
    );
    assert_eq!(table.exit_code(), 1);
    assert_eq!(runner.count("python -m pip uninstall"), 1);
}

#[tokio::test]
async fn test_missing_package_dir_aborts_before_authenticate() {
    let dir = create_test_dir();
    let runner = FakeRunner::new();
    let reporter = CaptureReporter::new();

    let result = Pipeline::new(&runner, &reporter)
        .run(&context(&dir.path().join("test-package")))
        .await;

    assert!(matches!(result, Err(PipelineError::PreconditionMissing(_))));
    assert!(runner.calls().is_empty());
    assert!(reporter
        .lines()
        .iter()
        .all(|l| !matches!(l, ReportLine::StageStatus { .. })));
}

#[tokio::test]
async fn test_unresolvable_client_fails_first_stage() {
    let dir = create_test_dir();
    let pkg = write_package_dir(dir.path());
    let runner = FakeRunner::new().missing_program("devpi");

    let table = Pipeline::new(&runner, &SilentReporter)
        .run(&context(&pkg))
        .await
        .unwrap();

    let auth = table.get(Stage::Authenticate);
    assert_eq!(auth.status, StageStatus::Failed);
    assert!(auth.diagnostic.as_deref().unwrap().contains("devpi"));
    assert_eq!(runner.calls().len(), 1);
}

#[tokio::test]
async fn test_summary_always_lists_three_stages() {
    let dir = create_test_dir();
    let pkg = write_package_dir(dir.path());
    let runner = FakeRunner::new().fail_when("devpi use https", 1, "unreachable");
    let reporter = CaptureReporter::new();

    Pipeline::new(&runner, &reporter)
        .run(&context(&pkg))
        .await
        .unwrap();

    let rows: Vec<(String, bool)> = reporter
        .lines()
        .into_iter()
        .filter_map(|l| match l {
            ReportLine::StageStatus { stage, passed } => Some((stage, passed)),
            _ => None,
        })
        .collect();
    assert_eq!(
        rows,
        vec![
            ("Authenticate".to_string(), false),
            ("Publish".to_string(), false),
            ("Retrieve".to_string(), false),
        ]
    );
    assert!(reporter.failures().contains(&"Some stages failed".to_string()));
}
