//! Language-model completion service
//!
//! The resolver only needs "prompt + output schema in, JSON object out".
//! `CompletionService` is that capability; `OpenAiCompatClient` is the HTTP
//! implementation and `DisabledCompletion` stands in when no API key is set.
//! Wrapping an implementation is the place to add retries.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

pub mod openai;

pub use openai::{OpenAiCompatClient, OpenAiCompatConfig};

/// Completion service errors
#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("Completion service not configured")]
    NotConfigured,

    #[error("Completion timed out after {0:?}")]
    Timeout(Duration),

    #[error("Network error: {0}")]
    Network(String),

    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Completion returned no content")]
    EmptyResponse,

    #[error("Parse error: {0}")]
    Parse(String),

    /// Output parsed but broke the requested contract
    #[error("Schema violation: {0}")]
    SchemaViolation(String),
}

/// Named JSON Schema the response must satisfy
#[derive(Debug, Clone, PartialEq)]
pub struct OutputSchema {
    pub name: &'static str,
    pub schema: Value,
}

/// One structured-output completion call
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// Role and standing rules
    pub system: String,
    /// Task-specific prompt
    pub prompt: String,
    pub output: OutputSchema,
}

/// Prompt in, structured object out
#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Identifier for logs (e.g. model name)
    fn name(&self) -> &str;

    async fn complete(&self, request: CompletionRequest) -> Result<Value, CompletionError>;

    fn is_available(&self) -> bool {
        true
    }
}

/// Run `request` with a deadline and decode the object into `T`
pub async fn complete_structured<T: DeserializeOwned>(
    service: &dyn CompletionService,
    request: CompletionRequest,
    timeout: Duration,
) -> Result<T, CompletionError> {
    let schema_name = request.output.name;
    let value = tokio::time::timeout(timeout, service.complete(request))
        .await
        .map_err(|_| CompletionError::Timeout(timeout))??;

    serde_json::from_value(value).map_err(|e| {
        CompletionError::SchemaViolation(format!("{} output did not match: {}", schema_name, e))
    })
}

/// Placeholder used when no completion API key is configured
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledCompletion;

#[async_trait]
impl CompletionService for DisabledCompletion {
    fn name(&self) -> &str {
        "disabled"
    }

    async fn complete(&self, _request: CompletionRequest) -> Result<Value, CompletionError> {
        Err(CompletionError::NotConfigured)
    }

    fn is_available(&self) -> bool {
        false
    }
}
