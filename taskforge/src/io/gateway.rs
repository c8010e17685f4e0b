//! Gateway to the external generative service.
//!
//! The [`Gateway`] trait decouples the repair loop from the actual transport
//! so tests can use scripted gateways that return predetermined artifacts.
//! The production implementation posts the chat payload over HTTPS with a
//! bounded timeout and validates the structured response against the
//! artifact schema before parsing it. The code string itself is a byte-level
//! pass-through; nothing in it is interpreted here.

use std::sync::LazyLock;
use std::time::Duration;

use anyhow::{Context, Result};
use jsonschema::Draft;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::core::types::GeneratedArtifact;
use crate::io::prompt::{ARTIFACT_SCHEMA, ChatRequest};

const MAX_UPSTREAM_BODY: usize = 2_000;

static ARTIFACT_VALIDATOR: LazyLock<jsonschema::Validator> = LazyLock::new(|| {
    let schema: Value =
        serde_json::from_str(ARTIFACT_SCHEMA).expect("artifact schema should be valid json");
    jsonschema::options()
        .with_draft(Draft::Draft202012)
        .build(&schema)
        .expect("artifact schema should compile")
});

/// Failure taxonomy for one model call.
///
/// Any of these is fatal for the whole task request: the repair loop never
/// retries a gateway failure, since a malformed or unreachable service cannot
/// be fixed by sending it more context.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The request never produced a usable response (connect, send, or
    /// timeout failure). Use [`GatewayError::is_timeout`] to distinguish
    /// timeouts when reporting.
    #[error("model request failed: {source}")]
    Transport {
        #[source]
        source: reqwest::Error,
    },
    /// The service was reachable but answered with a non-success status.
    #[error("model endpoint returned status {status}")]
    Upstream { status: u16, body: String },
    /// The response body does not conform to the required artifact shape.
    #[error("model response does not match the artifact schema: {0}")]
    Schema(String),
}

impl GatewayError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, GatewayError::Transport { source } if source.is_timeout())
    }

    /// Short taxonomy tag for structured reporting.
    pub fn tag(&self) -> &'static str {
        match self {
            GatewayError::Transport { .. } => "transport",
            GatewayError::Upstream { .. } => "upstream",
            GatewayError::Schema(_) => "schema",
        }
    }
}

/// Abstraction over the generative service.
pub trait Gateway {
    /// Submit one request and parse the structured response into an artifact.
    fn submit(&self, request: &ChatRequest) -> Result<GeneratedArtifact, GatewayError>;
}

/// Production gateway over HTTPS.
pub struct HttpGateway {
    client: reqwest::blocking::Client,
    endpoint: String,
    api_key: String,
}

impl HttpGateway {
    /// Build a gateway with the credential already resolved; the timeout
    /// bounds every call made through [`Gateway::submit`].
    pub fn new(endpoint: &str, api_key: String, timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .context("build http client")?;
        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
            api_key,
        })
    }
}

impl Gateway for HttpGateway {
    #[instrument(skip_all, fields(model = %request.model))]
    fn submit(&self, request: &ChatRequest) -> Result<GeneratedArtifact, GatewayError> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .map_err(|source| GatewayError::Transport { source })?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|source| GatewayError::Transport { source })?;

        if !status.is_success() {
            return Err(GatewayError::Upstream {
                status: status.as_u16(),
                body: truncate(&body, MAX_UPSTREAM_BODY),
            });
        }

        let content = extract_content(&body)?;
        let artifact = parse_artifact(&content)?;
        debug!(
            dependencies = artifact.dependencies.len(),
            code_bytes = artifact.code.len(),
            "parsed model artifact"
        );
        Ok(artifact)
    }
}

/// Completion envelope: `choices[0].message.content` holds the artifact JSON.
#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

/// Pull the content string out of the completion envelope.
pub(crate) fn extract_content(body: &str) -> Result<String, GatewayError> {
    let response: ChatResponse = serde_json::from_str(body)
        .map_err(|err| GatewayError::Schema(format!("completion envelope: {err}")))?;
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| GatewayError::Schema("completion envelope has no choices".to_string()))?;
    Ok(choice.message.content)
}

/// Validate the content against the artifact schema, then parse it.
pub(crate) fn parse_artifact(content: &str) -> Result<GeneratedArtifact, GatewayError> {
    let value: Value = serde_json::from_str(content)
        .map_err(|err| GatewayError::Schema(format!("content is not json: {err}")))?;

    let messages: Vec<String> = ARTIFACT_VALIDATOR
        .iter_errors(&value)
        .map(|err| err.to_string())
        .collect();
    if !messages.is_empty() {
        return Err(GatewayError::Schema(messages.join("; ")));
    }

    serde_json::from_value(value).map_err(|err| GatewayError::Schema(err.to_string()))
}

fn truncate(text: &str, limit: usize) -> String {
    if text.len() <= limit {
        return text.to_string();
    }
    let mut end = limit;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &text[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_conforming_artifact() {
        let content = r#"{
            "python_code": "print('hi')",
            "python_dependencies": [{"module": "requests"}, {"module": "pandas"}]
        }"#;

        let artifact = parse_artifact(content).expect("parse");
        assert_eq!(artifact.code, "print('hi')");
        let deps: Vec<&str> = artifact
            .dependencies
            .iter()
            .map(|d| d.module.as_str())
            .collect();
        assert_eq!(deps, vec!["requests", "pandas"]);
    }

    #[test]
    fn missing_code_field_is_a_schema_error() {
        let content = r#"{"python_dependencies": []}"#;
        let err = parse_artifact(content).unwrap_err();
        assert!(matches!(err, GatewayError::Schema(_)));
    }

    #[test]
    fn non_json_content_is_a_schema_error() {
        let err = parse_artifact("not json at all").unwrap_err();
        assert!(matches!(err, GatewayError::Schema(_)));
        assert!(!err.is_timeout());
    }

    #[test]
    fn dependency_entries_must_be_objects_with_module() {
        let content = r#"{"python_code": "x", "python_dependencies": ["requests"]}"#;
        let err = parse_artifact(content).unwrap_err();
        assert!(matches!(err, GatewayError::Schema(_)));
    }

    #[test]
    fn extracts_content_from_completion_envelope() {
        let body = r#"{
            "choices": [
                {"message": {"role": "assistant", "content": "{\"python_code\": \"x\", \"python_dependencies\": []}"}}
            ]
        }"#;

        let content = extract_content(body).expect("extract");
        let artifact = parse_artifact(&content).expect("parse");
        assert_eq!(artifact.code, "x");
        assert!(artifact.dependencies.is_empty());
    }

    #[test]
    fn empty_choices_is_a_schema_error() {
        let err = extract_content(r#"{"choices": []}"#).unwrap_err();
        assert!(matches!(err, GatewayError::Schema(_)));
    }

    #[test]
    fn upstream_error_reports_status_and_tag() {
        let err = GatewayError::Upstream {
            status: 503,
            body: "busy".to_string(),
        };
        assert_eq!(err.tag(), "upstream");
        assert!(err.to_string().contains("503"));
    }
}
