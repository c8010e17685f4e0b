//! End-to-end scenarios for the repair loop and the confined read interface,
//! using scripted gateway/sandbox doubles.

use taskforge::io::config::ForgeConfig;
use taskforge::io::data_dir::{DataDir, ReadError};
use taskforge::looping::{TaskStop, run_task};
use taskforge::test_support::{
    ScriptedGateway, ScriptedSandbox, artifact, failure_outcome, success_outcome,
};

fn config_in(temp: &tempfile::TempDir) -> ForgeConfig {
    ForgeConfig {
        scratch_dir: Some(temp.path().to_path_buf()),
        ..ForgeConfig::default()
    }
}

#[test]
fn task_that_succeeds_first_time_is_accepted_after_one_execution() {
    let temp = tempfile::tempdir().expect("tempdir");
    let config = config_in(&temp);

    let gateway = ScriptedGateway::new(vec![Ok(artifact(
        "with open('x.txt', 'w') as f:\n    f.write('hi')\n",
        &[],
    ))]);
    let sandbox = ScriptedSandbox::new(vec![success_outcome()]);

    let outcome = run_task(
        &config,
        &gateway,
        &sandbox,
        "create data/x.txt with content 'hi'",
    )
    .expect("run");

    assert_eq!(outcome.stop, TaskStop::Accepted);
    assert_eq!(outcome.executions, 1);
    assert_eq!(gateway.requests().len(), 1);
    assert_eq!(sandbox.requests().len(), 1);
}

#[test]
fn import_failure_is_repaired_on_the_second_execution() {
    let temp = tempfile::tempdir().expect("tempdir");
    let config = config_in(&temp);

    let import_error =
        "Traceback (most recent call last):\n  ...\nModuleNotFoundError: No module named 'dateutil'";
    let gateway = ScriptedGateway::new(vec![
        Ok(artifact("import dateutil\n", &[])),
        Ok(artifact("import dateutil\n", &["python-dateutil"])),
    ]);
    let sandbox = ScriptedSandbox::new(vec![failure_outcome(import_error), success_outcome()]);

    let outcome = run_task(&config, &gateway, &sandbox, "count the wednesdays").expect("run");

    assert_eq!(outcome.stop, TaskStop::Accepted);
    assert_eq!(outcome.executions, 2);

    // The repair request carried the failing code and the import error.
    let repair = &gateway.requests()[1].messages[1].content;
    assert!(repair.contains("import dateutil"));
    assert!(repair.contains("ModuleNotFoundError"));
}

#[test]
fn exhausted_task_reports_the_final_error_and_attempt_count() {
    let temp = tempfile::tempdir().expect("tempdir");
    let config = ForgeConfig {
        max_repairs: 1,
        ..config_in(&temp)
    };

    let gateway = ScriptedGateway::new(vec![Ok(artifact("a", &[])), Ok(artifact("b", &[]))]);
    let sandbox = ScriptedSandbox::new(vec![
        failure_outcome("first error"),
        failure_outcome("final error"),
    ]);

    let outcome = run_task(&config, &gateway, &sandbox, "doomed").expect("run");

    assert_eq!(outcome.executions, 2);
    assert_eq!(
        outcome.stop,
        TaskStop::Exhausted {
            last_error: "final error".to_string()
        }
    );
}

#[test]
fn read_of_missing_file_inside_root_is_not_found() {
    let temp = tempfile::tempdir().expect("tempdir");
    let data_dir = DataDir::new(temp.path()).expect("data dir");

    assert!(matches!(
        data_dir.read("report.csv"),
        Err(ReadError::NotFound)
    ));
}

#[test]
fn read_outside_root_is_invalid_regardless_of_trickery() {
    let temp = tempfile::tempdir().expect("tempdir");
    std::fs::write(temp.path().join("report.csv"), "a,b\n").expect("write");
    let data_dir = DataDir::new(temp.path()).expect("data dir");

    assert!(matches!(
        data_dir.read("/secrets/key"),
        Err(ReadError::InvalidPath)
    ));
    assert!(matches!(
        data_dir.read("../../../etc/passwd"),
        Err(ReadError::InvalidPath)
    ));
    assert_eq!(data_dir.read("report.csv").expect("read"), "a,b\n");
}
