//! Shared deterministic types for the task runner core.
//!
//! These types define stable contracts between core components. They should
//! not depend on external state or I/O and must remain deterministic across
//! runs.

use serde::{Deserialize, Serialize};

/// Code-plus-dependencies object synthesized by the model for one attempt.
///
/// Wire field names match the structured-output schema the model is asked to
/// conform to (`python_code` / `python_dependencies`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedArtifact {
    /// Python source for the task, without a dependency manifest.
    #[serde(rename = "python_code")]
    pub code: String,
    /// Declared third-party dependencies, in model order.
    #[serde(rename = "python_dependencies")]
    pub dependencies: Vec<Dependency>,
}

/// A single declared dependency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    /// Distribution name as the model declared it.
    pub module: String,
}

impl Dependency {
    pub fn new(module: impl Into<String>) -> Self {
        Self {
            module: module.into(),
        }
    }
}

/// Classified result of a completed script run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// The script exited with status 0.
    Success,
    /// The script failed; `error` is the diagnostic text fed back on repair.
    Failure { error: String },
}

impl Classification {
    pub fn is_success(&self) -> bool {
        matches!(self, Classification::Success)
    }
}

/// Captured result of one sandboxed execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionOutcome {
    /// Exit code of the child process. `None` when killed by a signal.
    pub exit_code: Option<i32>,
    /// Whether the run was killed after exceeding its time budget.
    pub timed_out: bool,
    /// Complete captured stdout (bounded by the configured output limit).
    pub stdout: String,
    /// Complete captured stderr (bounded by the configured output limit).
    pub stderr: String,
    /// Derived success/failure classification.
    pub classification: Classification,
}
