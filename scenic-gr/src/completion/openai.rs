//! OpenAI-compatible chat completions client
//!
//! Works against any `/chat/completions` endpoint that honours
//! `response_format: {"type": "json_object"}` (DeepSeek, OpenAI, most
//! gateways). The output schema is embedded in the system message.

use async_trait::async_trait;
use governor::{Quota, RateLimiter};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::num::NonZeroU32;
use std::time::Duration;

use super::{CompletionError, CompletionRequest, CompletionService};

/// Connection settings for an OpenAI-compatible endpoint
#[derive(Debug, Clone)]
pub struct OpenAiCompatConfig {
    /// Base URL without trailing `/chat/completions`, e.g. `https://api.deepseek.com/v1`
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub temperature: f32,
    pub requests_per_minute: u32,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    response_format: Value,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

/// HTTP completion client with client-side rate limiting
pub struct OpenAiCompatClient {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
    temperature: f32,
    rate_limiter: RateLimiter<
        governor::state::NotKeyed,
        governor::state::InMemoryState,
        governor::clock::DefaultClock,
    >,
}

impl OpenAiCompatClient {
    pub fn new(config: OpenAiCompatConfig, user_agent: &str) -> Result<Self, CompletionError> {
        // Total deadline is enforced per call by the resolver
        let client = Client::builder()
            .user_agent(user_agent)
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| CompletionError::Network(e.to_string()))?;

        let per_minute = NonZeroU32::new(config.requests_per_minute).unwrap_or(NonZeroU32::MIN);

        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            api_key: config.api_key,
            model: config.model,
            temperature: config.temperature,
            rate_limiter: RateLimiter::direct(Quota::per_minute(per_minute)),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl CompletionService for OpenAiCompatClient {
    fn name(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: CompletionRequest) -> Result<Value, CompletionError> {
        self.rate_limiter.until_ready().await;

        let body = ChatRequest {
            model: &self.model,
            temperature: self.temperature,
            response_format: json!({ "type": "json_object" }),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: Some(system_message(&request)),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: Some(request.prompt),
                },
            ],
        };

        tracing::debug!(
            model = %self.model,
            schema = request.output.name,
            "Sending completion request"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| CompletionError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(CompletionError::Api {
                status: status.as_u16(),
                body: error_text,
            });
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| CompletionError::Parse(e.to_string()))?;

        let content = chat
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(CompletionError::EmptyResponse)?;

        parse_json_content(&content)
    }
}

/// System prompt plus the schema the reply must satisfy
fn system_message(request: &CompletionRequest) -> String {
    let schema = serde_json::to_string_pretty(&request.output.schema)
        .unwrap_or_else(|_| request.output.schema.to_string());
    format!(
        "{}\n\nReply with a single JSON object (no prose, no code fences) that conforms to the \
         JSON Schema named \"{}\":\n{}",
        request.system, request.output.name, schema
    )
}

/// Decode message content, tolerating a surrounding Markdown code fence
fn parse_json_content(content: &str) -> Result<Value, CompletionError> {
    let trimmed = content.trim();
    let unfenced = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .unwrap_or(trimmed);

    let value: Value =
        serde_json::from_str(unfenced.trim()).map_err(|e| CompletionError::Parse(e.to_string()))?;
    if !value.is_object() {
        return Err(CompletionError::SchemaViolation(
            "expected a JSON object".to_string(),
        ));
    }
    Ok(value)
}
