//! OpenAI-compatible chat completions backend.
//!
//! This module provides [`OpenAiBackend`], which connects to any
//! OpenAI-compatible chat completions service. The default configuration
//! targets Groq's hosted Llama models, matching the deployment this project
//! was built for.

use async_trait::async_trait;
use reqwest::{Client, Response, header};
use std::time::Duration;

use crate::backend::{ChatBackend, with_retry};
use crate::error::{LlmError, Result};
use crate::types::{CompletionRequest, CompletionResponse, Message, Role, Usage};

/// Groq's OpenAI-compatible API base URL.
pub const GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// Default Groq model.
pub const DEFAULT_GROQ_MODEL: &str = "llama-3.1-8b-instant";

/// Default timeout for requests.
const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Configuration for the OpenAI-compatible backend.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// API key for authentication.
    pub api_key: String,

    /// Base URL for the API.
    pub base_url: String,

    /// Model to use (overrides the per-request model when set).
    pub model: Option<String>,

    /// Request timeout.
    pub timeout: Duration,

    /// Maximum retries for transient errors.
    pub max_retries: u32,

    /// Initial backoff duration for retries.
    pub retry_backoff: Duration,

    /// Name for this backend instance.
    pub name: String,
}

impl OpenAiConfig {
    /// Create a new config for Groq.
    pub fn groq(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: GROQ_BASE_URL.to_string(),
            model: Some(DEFAULT_GROQ_MODEL.to_string()),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_retries: 3,
            retry_backoff: Duration::from_millis(500),
            name: "groq".to_string(),
        }
    }

    /// Create a Groq config from the `GROQ_API_KEY` environment variable.
    pub fn groq_from_env() -> Result<Self> {
        let api_key = std::env::var("GROQ_API_KEY").map_err(|_| {
            LlmError::Config("GROQ_API_KEY environment variable not set".to_string())
        })?;
        Ok(Self::groq(api_key))
    }

    /// Set a custom base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the default model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set max retries.
    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }
}

/// OpenAI-compatible chat completions backend.
pub struct OpenAiBackend {
    client: Client,
    config: OpenAiConfig,
}

impl OpenAiBackend {
    /// Create a new backend with the given configuration.
    pub fn new(config: OpenAiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| LlmError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    /// Create a Groq backend from environment.
    pub fn groq_from_env() -> Result<Self> {
        Self::new(OpenAiConfig::groq_from_env()?)
    }

    /// Build the chat completions endpoint URL.
    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.config.base_url)
    }

    /// Convert our CompletionRequest to the OpenAI-compatible wire format.
    fn to_wire_request(&self, request: &CompletionRequest) -> WireChatRequest {
        let mut messages = Vec::with_capacity(request.messages.len() + 1);

        if let Some(ref system) = request.system {
            messages.push(WireMessage {
                role: "system".to_string(),
                content: system.clone(),
            });
        }

        for m in &request.messages {
            messages.push(WireMessage {
                role: match m.role {
                    Role::System => "system".to_string(),
                    Role::User => "user".to_string(),
                    Role::Assistant => "assistant".to_string(),
                },
                content: m.content.clone(),
            });
        }

        // Use config model if set, otherwise the request model
        let model = self
            .config
            .model
            .clone()
            .unwrap_or_else(|| request.model.clone());

        WireChatRequest {
            model,
            messages,
            max_tokens: Some(request.max_tokens),
            temperature: request.temperature,
        }
    }

    /// Handle a successful response.
    async fn handle_response(response: Response) -> Result<CompletionResponse> {
        if !response.status().is_success() {
            return Err(Self::handle_error_response(response).await);
        }

        let body = response.text().await?;
        let parsed: WireChatResponse =
            serde_json::from_str(&body).map_err(|e| LlmError::Serialization(e.to_string()))?;

        Ok(parsed.into())
    }

    /// Handle an error response.
    async fn handle_error_response(response: Response) -> LlmError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if let Ok(error) = serde_json::from_str::<WireErrorResponse>(&body) {
            match status.as_u16() {
                401 => LlmError::Auth(format!("Authentication failed: {}", error.error.message)),
                429 => LlmError::RateLimit(format!(
                    "Rate limit exceeded: {}",
                    error.error.message
                )),
                500..=599 => LlmError::Backend(format!("Server error: {}", error.error.message)),
                _ => LlmError::Backend(error.error.message),
            }
        } else {
            LlmError::Backend(format!("HTTP {}: {}", status, body))
        }
    }
}

#[async_trait]
impl ChatBackend for OpenAiBackend {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        let wire_request = self.to_wire_request(&request);

        tracing::debug!(
            backend = %self.config.name,
            model = %wire_request.model,
            messages = %wire_request.messages.len(),
            "Sending chat completion request"
        );

        with_retry(
            self.config.max_retries,
            self.config.retry_backoff,
            &self.config.name,
            || async {
                let response = self
                    .client
                    .post(self.completions_url())
                    .header(header::CONTENT_TYPE, "application/json")
                    .header(
                        header::AUTHORIZATION,
                        format!("Bearer {}", self.config.api_key),
                    )
                    .json(&wire_request)
                    .send()
                    .await?;

                Self::handle_response(response).await
            },
        )
        .await
    }

    fn name(&self) -> &str {
        &self.config.name
    }

    async fn health_check(&self) -> Result<()> {
        let model = self
            .config
            .model
            .clone()
            .unwrap_or_else(|| DEFAULT_GROQ_MODEL.to_string());
        let request = CompletionRequest::new(model, vec![Message::user("ping")], 1);

        match self.complete(request).await {
            Ok(_) => Ok(()),
            Err(LlmError::RateLimit(_)) => Ok(()), // Rate limit means reachable
            Err(e) => Err(e),
        }
    }
}

// OpenAI wire types

#[derive(Debug, serde::Serialize)]
struct WireChatRequest {
    model: String,
    messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, serde::Serialize)]
struct WireMessage {
    role: String,
    content: String,
}

#[derive(Debug, serde::Deserialize)]
struct WireChatResponse {
    id: String,
    choices: Vec<WireChoice>,
    model: String,
    usage: Option<WireUsage>,
}

impl From<WireChatResponse> for CompletionResponse {
    fn from(resp: WireChatResponse) -> Self {
        let text = resp
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();

        let usage = resp.usage.unwrap_or(WireUsage {
            prompt_tokens: 0,
            completion_tokens: 0,
        });

        CompletionResponse {
            id: resp.id,
            model: resp.model,
            text,
            usage: Usage::new(usage.prompt_tokens, usage.completion_tokens),
        }
    }
}

#[derive(Debug, serde::Deserialize)]
struct WireChoice {
    message: WireResponseMessage,
}

#[derive(Debug, serde::Deserialize)]
struct WireResponseMessage {
    content: Option<String>,
}

#[derive(Debug, serde::Deserialize)]
struct WireUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[derive(Debug, serde::Deserialize)]
struct WireErrorResponse {
    error: WireError,
}

#[derive(Debug, serde::Deserialize)]
struct WireError {
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_groq_config() {
        let config = OpenAiConfig::groq("test-key");
        assert_eq!(config.api_key, "test-key");
        assert!(config.base_url.contains("groq.com"));
        assert_eq!(config.name, "groq");
        assert_eq!(config.model.as_deref(), Some(DEFAULT_GROQ_MODEL));
    }

    #[test]
    fn test_config_builder() {
        let config = OpenAiConfig::groq("key")
            .with_base_url("http://custom.api")
            .with_model("llama-3.3-70b-versatile")
            .with_timeout(Duration::from_secs(60));

        assert_eq!(config.base_url, "http://custom.api");
        assert_eq!(config.model.as_deref(), Some("llama-3.3-70b-versatile"));
        assert_eq!(config.timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_completions_url() {
        let config = OpenAiConfig::groq("key");
        let backend = OpenAiBackend::new(config).unwrap();
        assert_eq!(
            backend.completions_url(),
            "https://api.groq.com/openai/v1/chat/completions"
        );
    }

    #[test]
    fn test_to_wire_request_orders_system_first() {
        let config = OpenAiConfig::groq("key");
        let backend = OpenAiBackend::new(config).unwrap();

        let request = CompletionRequest::new(
            "ignored-model",
            vec![
                Message::user("Hello"),
                Message::assistant("Hi"),
                Message::system("Relevant context"),
                Message::user("Tell me more"),
            ],
            100,
        )
        .with_system("Persona prompt");

        let wire = backend.to_wire_request(&request);
        // Config model wins over the request model
        assert_eq!(wire.model, DEFAULT_GROQ_MODEL);
        assert_eq!(wire.messages.len(), 5);
        assert_eq!(wire.messages[0].role, "system");
        assert_eq!(wire.messages[0].content, "Persona prompt");
        assert_eq!(wire.messages[3].role, "system");
        assert_eq!(wire.messages[3].content, "Relevant context");
        assert_eq!(wire.messages[4].role, "user");
    }

    #[test]
    fn test_wire_response_conversion() {
        let body = r#"{
            "id": "chatcmpl-123",
            "model": "llama-3.1-8b-instant",
            "choices": [{"message": {"role": "assistant", "content": "Future-Aziz: hello"}}],
            "usage": {"prompt_tokens": 10, "completion_tokens": 5}
        }"#;

        let parsed: WireChatResponse = serde_json::from_str(body).unwrap();
        let response: CompletionResponse = parsed.into();
        assert_eq!(response.id, "chatcmpl-123");
        assert_eq!(response.text, "Future-Aziz: hello");
        assert_eq!(response.usage.input_tokens, 10);
        assert_eq!(response.usage.output_tokens, 5);
    }

    #[test]
    fn test_wire_response_no_choices() {
        let body = r#"{"id": "x", "model": "m", "choices": []}"#;
        let parsed: WireChatResponse = serde_json::from_str(body).unwrap();
        let response: CompletionResponse = parsed.into();
        assert!(response.text.is_empty());
        assert_eq!(response.usage.total(), 0);
    }
}
