//! Deterministic classification of a completed script run.
//!
//! Classification is driven purely by the exit status: `0` is success,
//! anything else (including a timeout kill or death by signal) is a failure.
//! Captured stderr is diagnostic payload only and never decides the outcome.

use crate::core::types::{Classification, ExecutionOutcome};

/// Classify a completed run from its exit status.
///
/// The returned `Failure` carries the trimmed stderr as the error text; when
/// stderr is empty a synthesized one-line description is used instead so a
/// repair request always has something concrete to work with.
pub fn classify(exit_code: Option<i32>, timed_out: bool, stderr: &str) -> Classification {
    if timed_out {
        return Classification::Failure {
            error: failure_text(stderr, "execution timed out"),
        };
    }
    match exit_code {
        Some(0) => Classification::Success,
        Some(code) => Classification::Failure {
            error: failure_text(stderr, &format!("process exited with status {code}")),
        },
        None => Classification::Failure {
            error: failure_text(stderr, "process terminated by signal"),
        },
    }
}

/// Assemble a full [`ExecutionOutcome`] from captured process output.
pub fn outcome_from_capture(
    exit_code: Option<i32>,
    timed_out: bool,
    stdout: String,
    stderr: String,
) -> ExecutionOutcome {
    let classification = classify(exit_code, timed_out, &stderr);
    ExecutionOutcome {
        exit_code,
        timed_out,
        stdout,
        stderr,
        classification,
    }
}

fn failure_text(stderr: &str, fallback: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        fallback.to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_exit_is_success() {
        assert_eq!(classify(Some(0), false, ""), Classification::Success);
    }

    #[test]
    fn zero_exit_with_noisy_stderr_is_still_success() {
        // Warnings on stderr must not flip a successful run.
        assert_eq!(
            classify(Some(0), false, "DeprecationWarning: ..."),
            Classification::Success
        );
    }

    #[test]
    fn nonzero_exit_without_traceback_is_failure() {
        // The exit status decides; no stderr pattern matching.
        let got = classify(Some(1), false, "");
        assert_eq!(
            got,
            Classification::Failure {
                error: "process exited with status 1".to_string()
            }
        );
    }

    #[test]
    fn nonzero_exit_carries_stderr_as_error() {
        let stderr = "Traceback (most recent call last):\n  File \"task.py\", line 1\n";
        let got = classify(Some(1), false, stderr);
        assert_eq!(
            got,
            Classification::Failure {
                error: stderr.trim().to_string()
            }
        );
    }

    #[test]
    fn timeout_is_failure_even_with_zero_exit() {
        let got = classify(Some(0), true, "");
        assert_eq!(
            got,
            Classification::Failure {
                error: "execution timed out".to_string()
            }
        );
    }

    #[test]
    fn signal_death_is_failure() {
        let got = classify(None, false, "");
        assert_eq!(
            got,
            Classification::Failure {
                error: "process terminated by signal".to_string()
            }
        );
    }

    #[test]
    fn outcome_keeps_captured_streams() {
        let outcome = outcome_from_capture(Some(2), false, "out".to_string(), "err".to_string());
        assert_eq!(outcome.exit_code, Some(2));
        assert_eq!(outcome.stdout, "out");
        assert_eq!(outcome.stderr, "err");
        assert!(!outcome.classification.is_success());
    }
}
