//! Chat and content-generation client boundary.
//!
//! # Responsibility
//! - Define the chat client contract used by the web layer.
//! - Map provider failures to typed errors callers can branch on.
//!
//! # Invariants
//! - Provider errors surface as `AiError` values, never as panics.
//! - Log events carry metadata only, never prompt or response content.

use std::error::Error;
use std::fmt::{Display, Formatter};

mod openai;

pub use openai::{AiClientConfig, OpenAiChatClient};

pub type AiResult<T> = Result<T, AiError>;

/// Error type for chat completion calls.
#[derive(Debug)]
pub enum AiError {
    /// The client was configured without an API key.
    MissingApiKey,
    /// Transport-level failure (connect, timeout, TLS, decode).
    Http(reqwest::Error),
    /// The provider answered with a non-success status.
    Api { status: u16, message: String },
    /// The provider answered successfully but without usable text.
    EmptyResponse,
}

impl Display for AiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingApiKey => write!(f, "chat client requires an API key"),
            Self::Http(err) => write!(f, "{err}"),
            Self::Api { status, message } => {
                write!(f, "chat provider returned status {status}: {message}")
            }
            Self::EmptyResponse => write!(f, "chat provider returned an empty response"),
        }
    }
}

impl Error for AiError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Http(err) => Some(err),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for AiError {
    fn from(value: reqwest::Error) -> Self {
        Self::Http(value)
    }
}

/// Speaker role of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

impl ChatRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// One message of conversation context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// Kind of educational content to generate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    Text,
    Quiz,
    Explanation,
    Summary,
}

impl ContentKind {
    /// Fixed system prompt steering the provider per content kind.
    pub fn system_prompt(&self) -> &'static str {
        match self {
            Self::Text => "You are an educational assistant.",
            Self::Quiz => {
                "Create a quiz with 5 multiple-choice questions based on the following topic:"
            }
            Self::Explanation => {
                "Provide a detailed explanation of the following concept for students:"
            }
            Self::Summary => "Create a concise summary of the following educational content:",
        }
    }
}

/// Chat completion contract implemented by provider clients.
pub trait ChatClient {
    /// Completes `prompt` given prior conversation `context`.
    fn complete(&self, prompt: &str, context: &[ChatMessage]) -> AiResult<String>;

    /// Generates educational content of the given kind from a topic prompt.
    fn generate_content(&self, prompt: &str, kind: ContentKind) -> AiResult<String> {
        let context = [ChatMessage::system(kind.system_prompt())];
        self.complete(prompt, &context)
    }
}

#[cfg(test)]
mod tests {
    use super::{AiError, AiResult, ChatClient, ChatMessage, ChatRole, ContentKind};

    struct EchoClient;

    impl ChatClient for EchoClient {
        fn complete(&self, prompt: &str, context: &[ChatMessage]) -> AiResult<String> {
            let system = context
                .iter()
                .find(|message| message.role == ChatRole::System)
                .map(|message| message.content.as_str())
                .unwrap_or("");
            Ok(format!("{system}|{prompt}"))
        }
    }

    #[test]
    fn generate_content_prepends_kind_system_prompt() {
        let output = EchoClient
            .generate_content("photosynthesis", ContentKind::Explanation)
            .unwrap();
        assert!(output.starts_with(ContentKind::Explanation.system_prompt()));
        assert!(output.ends_with("photosynthesis"));
    }

    #[test]
    fn api_error_display_keeps_status_and_message() {
        let err = AiError::Api {
            status: 429,
            message: "rate limited".to_string(),
        };
        let rendered = err.to_string();
        assert!(rendered.contains("429"));
        assert!(rendered.contains("rate limited"));
    }
}
