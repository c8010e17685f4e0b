//! Request builder for the generative service.
//!
//! Composes the chat payload sent on synthesis and repair: a fixed policy
//! preamble, the task description, and on repair the prior code and the
//! captured error verbatim. The payload pins a structured-output schema so
//! the model must answer with a code string plus a dependency list. Pure
//! transformation; no side effects.

use std::path::Path;
use std::sync::LazyLock;

use anyhow::Result;
use minijinja::{Environment, context};
use serde::Serialize;
use serde_json::{Value, json};

const SYSTEM_TEMPLATE: &str = include_str!("prompts/system.md");
const SYNTHESIS_TEMPLATE: &str = include_str!("prompts/synthesis.md");
const REPAIR_TEMPLATE: &str = include_str!("prompts/repair.md");

/// JSON Schema the model's structured output must conform to.
pub const ARTIFACT_SCHEMA: &str = include_str!("../../schemas/artifact.schema.json");

static RESPONSE_FORMAT: LazyLock<Value> = LazyLock::new(|| {
    let schema: Value =
        serde_json::from_str(ARTIFACT_SCHEMA).expect("artifact schema should be valid json");
    json!({
        "type": "json_schema",
        "json_schema": {
            "name": "task_runner",
            "schema": schema,
        }
    })
});

/// One role-tagged chat message.
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

/// Complete request payload for one model call.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub response_format: Value,
}

/// Prior attempt fed back into a repair request.
#[derive(Debug, Clone)]
pub struct RepairContext {
    /// Code body of the previous artifact, verbatim.
    pub code: String,
    /// Captured error text from the previous execution, verbatim.
    pub error: String,
}

/// Builds synthesis and repair requests for one configured model.
pub struct RequestBuilder {
    env: Environment<'static>,
    model: String,
    data_root: String,
}

impl RequestBuilder {
    pub fn new(model: &str, data_root: &Path) -> Self {
        let mut env = Environment::new();
        env.add_template("system", SYSTEM_TEMPLATE)
            .expect("system template should be valid");
        env.add_template("synthesis", SYNTHESIS_TEMPLATE)
            .expect("synthesis template should be valid");
        env.add_template("repair", REPAIR_TEMPLATE)
            .expect("repair template should be valid");
        Self {
            env,
            model: model.to_string(),
            data_root: data_root.display().to_string(),
        }
    }

    /// Request for the first attempt at a task.
    pub fn synthesis(&self, task: &str) -> Result<ChatRequest> {
        let user = self
            .env
            .get_template("synthesis")?
            .render(context! { task => task })?;
        self.build(user)
    }

    /// Request for a repair attempt, carrying the prior code and error.
    pub fn repair(&self, task: &str, prior: &RepairContext) -> Result<ChatRequest> {
        let user = self.env.get_template("repair")?.render(context! {
            task => task,
            code => prior.code.as_str(),
            error => prior.error.as_str(),
        })?;
        self.build(user)
    }

    fn build(&self, user: String) -> Result<ChatRequest> {
        let system = self
            .env
            .get_template("system")?
            .render(context! { data_root => self.data_root.as_str() })?;
        Ok(ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system,
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user,
                },
            ],
            response_format: RESPONSE_FORMAT.clone(),
        })
    }
}
