//! OpenAI-compatible chat completion client.
//!
//! # Responsibility
//! - Implement `ChatClient` against a `/chat/completions` endpoint.
//! - Keep configuration explicit; no process-global API key state.
//!
//! # Invariants
//! - Requests carry a bounded timeout.
//! - Non-success provider responses become `AiError::Api` with the
//!   provider's message preserved.

use crate::ai::{AiError, AiResult, ChatClient, ChatMessage};
use log::{error, info};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
const DEFAULT_MAX_TOKENS: u32 = 500;
const DEFAULT_TEMPERATURE: f64 = 0.7;
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Explicit configuration for the chat client.
#[derive(Debug, Clone)]
pub struct AiClientConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f64,
    pub timeout: Duration,
}

impl AiClientConfig {
    /// Creates a config with provider defaults for the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Blocking HTTP implementation of [`ChatClient`].
pub struct OpenAiChatClient {
    http: reqwest::blocking::Client,
    config: AiClientConfig,
}

impl OpenAiChatClient {
    /// Builds a client from explicit configuration.
    pub fn new(config: AiClientConfig) -> AiResult<Self> {
        if config.api_key.trim().is_empty() {
            return Err(AiError::MissingApiKey);
        }

        let http = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .build()?;

        Ok(Self { http, config })
    }
}

impl ChatClient for OpenAiChatClient {
    fn complete(&self, prompt: &str, context: &[ChatMessage]) -> AiResult<String> {
        let started_at = Instant::now();

        let mut messages: Vec<WireMessage<'_>> = context
            .iter()
            .map(|message| WireMessage {
                role: message.role.as_str(),
                content: message.content.as_str(),
            })
            .collect();
        messages.push(WireMessage {
            role: "user",
            content: prompt,
        });

        let request = ChatCompletionRequest {
            model: self.config.model.as_str(),
            messages,
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        let url = format!("{}/chat/completions", self.config.base_url);
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let message = extract_error_message(response);
            error!(
                "event=chat_complete module=ai status=error http_status={} duration_ms={}",
                status.as_u16(),
                started_at.elapsed().as_millis()
            );
            return Err(AiError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let completion: ChatCompletionResponse = response.json()?;
        let text = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or(AiError::EmptyResponse)?;

        info!(
            "event=chat_complete module=ai status=ok model={} context_messages={} duration_ms={}",
            self.config.model,
            context.len(),
            started_at.elapsed().as_millis()
        );
        Ok(text)
    }
}

/// Pulls the provider's error message out of a failure body, falling back to
/// raw text when the body is not the expected JSON shape.
fn extract_error_message(response: reqwest::blocking::Response) -> String {
    let body = response.text().unwrap_or_default();
    match serde_json::from_str::<ProviderErrorBody>(&body) {
        Ok(parsed) => parsed.error.message,
        Err(_) if body.is_empty() => "no error body".to_string(),
        Err(_) => body,
    }
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    max_tokens: u32,
    temperature: f64,
}

#[derive(Serialize)]
struct WireMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ProviderErrorBody {
    error: ProviderError,
}

#[derive(Deserialize)]
struct ProviderError {
    message: String,
}

#[cfg(test)]
mod tests {
    use super::{AiClientConfig, OpenAiChatClient};
    use crate::ai::AiError;

    #[test]
    fn client_rejects_blank_api_key() {
        let result = OpenAiChatClient::new(AiClientConfig::new("  "));
        assert!(matches!(result, Err(AiError::MissingApiKey)));
    }

    #[test]
    fn config_defaults_target_chat_completions() {
        let config = AiClientConfig::new("k");
        assert_eq!(config.model, "gpt-3.5-turbo");
        assert_eq!(config.max_tokens, 500);
        assert!(config.base_url.starts_with("https://"));
    }
}
