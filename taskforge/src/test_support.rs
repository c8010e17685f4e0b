//! Test-only scripted doubles for the gateway and sandbox seams.

use std::cell::RefCell;
use std::collections::VecDeque;

use anyhow::Result;

use crate::core::types::{
    Classification, Dependency, ExecutionOutcome, GeneratedArtifact,
};
use crate::io::gateway::{Gateway, GatewayError};
use crate::io::prompt::ChatRequest;
use crate::io::sandbox::{ExecRequest, Sandbox};

/// Build an artifact with the given code and dependency names.
pub fn artifact(code: &str, deps: &[&str]) -> GeneratedArtifact {
    GeneratedArtifact {
        code: code.to_string(),
        dependencies: deps.iter().copied().map(Dependency::new).collect(),
    }
}

/// Outcome of a run that exited 0 with empty streams.
pub fn success_outcome() -> ExecutionOutcome {
    ExecutionOutcome {
        exit_code: Some(0),
        timed_out: false,
        stdout: String::new(),
        stderr: String::new(),
        classification: Classification::Success,
    }
}

/// Outcome of a run that exited 1 with `stderr` captured.
pub fn failure_outcome(stderr: &str) -> ExecutionOutcome {
    ExecutionOutcome {
        exit_code: Some(1),
        timed_out: false,
        stdout: String::new(),
        stderr: stderr.to_string(),
        classification: Classification::Failure {
            error: stderr.to_string(),
        },
    }
}

/// Gateway double that replays predetermined results and records every
/// request it receives.
pub struct ScriptedGateway {
    results: RefCell<VecDeque<Result<GeneratedArtifact, GatewayError>>>,
    requests: RefCell<Vec<ChatRequest>>,
}

impl ScriptedGateway {
    pub fn new(results: Vec<Result<GeneratedArtifact, GatewayError>>) -> Self {
        Self {
            results: RefCell::new(results.into()),
            requests: RefCell::new(Vec::new()),
        }
    }

    /// Requests received so far, in order.
    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.borrow().clone()
    }
}

impl Gateway for ScriptedGateway {
    fn submit(&self, request: &ChatRequest) -> Result<GeneratedArtifact, GatewayError> {
        self.requests.borrow_mut().push(request.clone());
        self.results
            .borrow_mut()
            .pop_front()
            .expect("scripted gateway ran out of results")
    }
}

/// Sandbox double that replays predetermined outcomes and records every
/// request it receives.
pub struct ScriptedSandbox {
    outcomes: RefCell<VecDeque<ExecutionOutcome>>,
    requests: RefCell<Vec<ExecRequest>>,
}

impl ScriptedSandbox {
    pub fn new(outcomes: Vec<ExecutionOutcome>) -> Self {
        Self {
            outcomes: RefCell::new(outcomes.into()),
            requests: RefCell::new(Vec::new()),
        }
    }

    /// Requests received so far, in order.
    pub fn requests(&self) -> Vec<ExecRequest> {
        self.requests.borrow().clone()
    }
}

impl Sandbox for ScriptedSandbox {
    fn execute(&self, request: &ExecRequest) -> Result<ExecutionOutcome> {
        self.requests.borrow_mut().push(request.clone());
        Ok(self
            .outcomes
            .borrow_mut()
            .pop_front()
            .expect("scripted sandbox ran out of outcomes"))
    }
}
