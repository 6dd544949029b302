use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

pub mod openai;
pub mod prompt;

/// Reasons a classification call produced no usable answer.
///
/// Callers treat every variant as "no match"; the variant only feeds the
/// counters logged at the end of a run.
#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("failed to build classifier client: {0}")]
    Build(String),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    #[error("endpoint returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("malformed response: {0}")]
    Malformed(String),
    #[error("empty completion")]
    EmptyCompletion,
}

impl ClassifierError {
    /// Stable label used as a counter key.
    pub fn kind(&self) -> &'static str {
        match self {
            ClassifierError::Build(_) => "build",
            ClassifierError::Transport(_) => "transport",
            ClassifierError::Timeout(_) => "timeout",
            ClassifierError::Status { .. } => "status",
            ClassifierError::Malformed(_) => "malformed",
            ClassifierError::EmptyCompletion => "empty",
        }
    }
}

pub type ClassifierResult<T> = Result<T, ClassifierError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// A single text-completion request.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationRequest {
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
}

impl ClassificationRequest {
    /// Builds a request with deterministic sampling.
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            temperature: 0.0,
        }
    }

    /// Concatenated content of all messages, handy for logs and fakes.
    pub fn prompt_text(&self) -> String {
        self.messages
            .iter()
            .map(|message| message.content.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// An abstraction over the external text-classification service.
///
/// Implementations hold no per-call state and may be shared between tasks.
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Sends one request and returns the raw completion text.
    async fn complete(&self, request: &ClassificationRequest) -> ClassifierResult<String>;
}

/// Builds the shared HTTP client with the configured per-call timeout.
pub fn build_reqwest_client(timeout: Duration) -> ClassifierResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout)
        .build()
        .map_err(|e| ClassifierError::Build(e.to_string()))
}
