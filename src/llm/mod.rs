//! AI assistant backed by an OpenAI-compatible chat completion API.
//!
//! The HTTP client is blocking; async callers run it on
//! `tokio::task::spawn_blocking`.

pub mod assistant;
pub mod client;
pub mod prompts;
pub mod types;

use thiserror::Error;

pub use assistant::{chat_message, chat_reply, diet_recommendations, educational_content, exercise_plan};
pub use client::{MockLlmClient, OpenAiClient};
pub use types::*;

#[derive(Error, Debug)]
pub enum LlmError {
    #[error("AI assistant is not configured")]
    NotConfigured,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Cannot reach LLM provider at {0}")]
    Connection(String),

    #[error("LLM request timed out after {0}s")]
    Timeout(u64),

    #[error("LLM provider returned {status}: {body}")]
    Provider { status: u16, body: String },

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("LLM response had no content")]
    EmptyResponse,

    #[error("LLM response was not the expected JSON: {0}")]
    ResponseParsing(String),
}

impl LlmError {
    /// Failures of the provider itself rather than of its output.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            LlmError::Connection(_)
                | LlmError::Timeout(_)
                | LlmError::Provider { .. }
                | LlmError::HttpClient(_)
        )
    }
}

/// One chat completion call.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub messages: Vec<ChatMessage>,
    /// Ask the provider for a single JSON object.
    pub json_response: bool,
}

/// LLM client abstraction (allows mocking)
pub trait LlmClient: Send + Sync {
    fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError>;

    fn model(&self) -> &str;
}
