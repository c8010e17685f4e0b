//! Bounded synthesize–execute–repair loop for one task request.

use anyhow::{Context, Result};
use tracing::{info, instrument, warn};

use crate::core::manifest::render_unit;
use crate::core::pydeps::vet_dependencies;
use crate::core::types::Classification;
use crate::io::config::ForgeConfig;
use crate::io::gateway::Gateway;
use crate::io::prompt::{RepairContext, RequestBuilder};
use crate::io::sandbox::{ExecRequest, Sandbox};
use crate::io::scratch::ScratchDir;

/// Reason why a task request reached a terminal state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskStop {
    /// An execution succeeded; the task is done.
    Accepted,
    /// Every execution failed and the repair budget is spent.
    Exhausted {
        /// Error text captured from the final failed execution.
        last_error: String,
    },
}

/// Summary of one task request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskOutcome {
    /// Scratch directory name identifying this request.
    pub request_id: String,
    /// Number of executions performed (1..=max_repairs+1).
    pub executions: u32,
    pub stop: TaskStop,
}

impl TaskOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self.stop, TaskStop::Accepted)
    }
}

/// Drive one task to a terminal state: synthesize code, execute it, and feed
/// captured errors back to the model until it succeeds or the repair budget
/// (`config.max_repairs`) is spent.
///
/// Terminal outcomes are `Ok` values; an `Err` means the request died on an
/// infrastructure failure. Any gateway failure is fatal for the whole request
/// and is never retried here (callers can downcast to
/// [`crate::io::gateway::GatewayError`] for the taxonomy).
#[instrument(skip_all, fields(task_bytes = task.len()))]
pub fn run_task<G: Gateway, S: Sandbox>(
    config: &ForgeConfig,
    gateway: &G,
    sandbox: &S,
    task: &str,
) -> Result<TaskOutcome> {
    let builder = RequestBuilder::new(&config.model, &config.data_root);
    let scratch = ScratchDir::create(&config.scratch_base())?;
    info!(request_id = %scratch.name(), "task accepted");

    // Run the attempts in a closure so the scratch directory is cleaned up on
    // every exit path, including fatal gateway errors.
    let result = (|| -> Result<TaskOutcome> {
        let max_executions = config.max_repairs + 1;
        let mut prior: Option<RepairContext> = None;
        let mut executions = 0u32;

        loop {
            let request = match &prior {
                None => builder.synthesis(task)?,
                Some(context) => builder.repair(task, context)?,
            };

            let mut artifact = gateway
                .submit(&request)
                .map_err(anyhow::Error::new)
                .context("model call failed")?;

            let dropped = vet_dependencies(&mut artifact);
            if !dropped.is_empty() {
                warn!(dropped = ?dropped, "dropped declared dependencies");
            }

            let script = scratch.write_unit(&render_unit(&artifact))?;
            let outcome = sandbox.execute(&ExecRequest {
                script,
                workdir: scratch.path().to_path_buf(),
                timeout: config.exec_timeout(),
                output_limit_bytes: config.output_limit_bytes,
            })?;
            executions += 1;

            match outcome.classification {
                Classification::Success => {
                    info!(executions, "task accepted after successful execution");
                    return Ok(TaskOutcome {
                        request_id: scratch.name().to_string(),
                        executions,
                        stop: TaskStop::Accepted,
                    });
                }
                Classification::Failure { error } => {
                    if executions >= max_executions {
                        warn!(executions, "repair budget spent");
                        return Ok(TaskOutcome {
                            request_id: scratch.name().to_string(),
                            executions,
                            stop: TaskStop::Exhausted { last_error: error },
                        });
                    }
                    info!(executions, "execution failed, requesting repair");
                    prior = Some(RepairContext {
                        code: artifact.code,
                        error,
                    });
                }
            }
        }
    })();

    if !config.keep_scratch {
        if let Err(err) = scratch.cleanup() {
            warn!(err = %err, "failed to clean up scratch directory");
        }
    }
    result
}
