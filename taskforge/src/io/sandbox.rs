//! Sandboxed execution of materialized units.
//!
//! The [`Sandbox`] trait decouples the repair loop from the actual runtime
//! (currently `uv run`). Tests use scripted sandboxes that return
//! predetermined outcomes without spawning processes.

use std::path::PathBuf;
use std::process::Command;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{info, instrument, warn};

use crate::core::classify::outcome_from_capture;
use crate::core::types::ExecutionOutcome;
use crate::io::process::run_command_with_timeout;

/// Parameters for one sandboxed run.
#[derive(Debug, Clone)]
pub struct ExecRequest {
    /// Path to the materialized unit.
    pub script: PathBuf,
    /// Working directory for the child process.
    pub workdir: PathBuf,
    /// Maximum time the run may take before being killed.
    pub timeout: Duration,
    /// Truncate captured stdout/stderr beyond this many bytes.
    pub output_limit_bytes: usize,
}

/// Abstraction over script execution backends.
pub trait Sandbox {
    /// Run the unit and classify the outcome. Errors are infrastructure
    /// failures only (e.g. the runtime binary is missing); a failing script
    /// is an `Ok` outcome with a `Failure` classification.
    fn execute(&self, request: &ExecRequest) -> Result<ExecutionOutcome>;
}

/// Sandbox that spawns `uv run`.
///
/// `uv` reads the unit's inline metadata, resolves the declared dependencies
/// into an ephemeral environment, and runs the code body. `--no-project`
/// keeps any pyproject near the working directory out of resolution.
pub struct UvSandbox;

impl Sandbox for UvSandbox {
    #[instrument(skip_all, fields(script = %request.script.display(), timeout_secs = request.timeout.as_secs()))]
    fn execute(&self, request: &ExecRequest) -> Result<ExecutionOutcome> {
        info!("starting sandboxed run");

        let mut cmd = Command::new("uv");
        cmd.arg("run")
            .arg("--no-project")
            .arg(&request.script)
            .current_dir(&request.workdir);

        let output = run_command_with_timeout(cmd, request.timeout, request.output_limit_bytes)
            .context("run uv")?;

        if output.timed_out {
            warn!(
                timeout_secs = request.timeout.as_secs(),
                "sandboxed run timed out"
            );
        }

        Ok(outcome_from_capture(
            output.status.code(),
            output.timed_out,
            String::from_utf8_lossy(&output.stdout).into_owned(),
            String::from_utf8_lossy(&output.stderr).into_owned(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Classification;

    /// Sandbox double standing in for `uv` so outcome assembly can be tested
    /// without the binary installed.
    struct ShSandbox;

    impl Sandbox for ShSandbox {
        fn execute(&self, request: &ExecRequest) -> Result<ExecutionOutcome> {
            let mut cmd = Command::new("sh");
            cmd.arg(&request.script).current_dir(&request.workdir);
            let output =
                run_command_with_timeout(cmd, request.timeout, request.output_limit_bytes)?;
            Ok(outcome_from_capture(
                output.status.code(),
                output.timed_out,
                String::from_utf8_lossy(&output.stdout).into_owned(),
                String::from_utf8_lossy(&output.stderr).into_owned(),
            ))
        }
    }

    fn request_for(script: &std::path::Path) -> ExecRequest {
        ExecRequest {
            script: script.to_path_buf(),
            workdir: script.parent().expect("parent").to_path_buf(),
            timeout: Duration::from_secs(5),
            output_limit_bytes: 10_000,
        }
    }

    #[test]
    fn successful_run_classifies_success() {
        let temp = tempfile::tempdir().expect("tempdir");
        let script = temp.path().join("ok.sh");
        std::fs::write(&script, "echo done\n").expect("write");

        let outcome = ShSandbox.execute(&request_for(&script)).expect("execute");
        assert_eq!(outcome.classification, Classification::Success);
        assert_eq!(outcome.stdout.trim(), "done");
    }

    #[test]
    fn failing_run_carries_stderr_as_error() {
        let temp = tempfile::tempdir().expect("tempdir");
        let script = temp.path().join("fail.sh");
        std::fs::write(&script, "echo broken >&2\nexit 2\n").expect("write");

        let outcome = ShSandbox.execute(&request_for(&script)).expect("execute");
        match outcome.classification {
            Classification::Failure { error } => assert_eq!(error, "broken"),
            Classification::Success => panic!("expected failure"),
        }
        assert_eq!(outcome.exit_code, Some(2));
    }
}
