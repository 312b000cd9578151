//! Completion-service boundary.
//!
//! The pipeline only needs one stateless call: system + user message in, text
//! out. [`OpenAiClient`] talks to an OpenAI-compatible chat-completions
//! endpoint; [`MockCompletionClient`] replays a scripted reply.

pub mod mock;
pub mod openai;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use mock::MockCompletionClient;
pub use openai::OpenAiClient;

pub const DEFAULT_TEMPERATURE: f32 = 0.2;
pub const DEFAULT_TOP_P: f32 = 0.95;

#[derive(Error, Debug)]
pub enum LlmError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("completion service returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub system_message: String,
    pub user_message: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub top_p: f32,
    pub frequency_penalty: f32,
    pub presence_penalty: f32,
}

impl CompletionRequest {
    /// Request with the extraction's fixed sampling parameters.
    pub fn new(
        system_message: impl Into<String>,
        user_message: impl Into<String>,
        model: impl Into<String>,
        max_tokens: u32,
    ) -> Self {
        Self {
            system_message: system_message.into(),
            user_message: user_message.into(),
            model: model.into(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens,
            top_p: DEFAULT_TOP_P,
            frequency_penalty: 0.0,
            presence_penalty: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub text: String,
}

#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, LlmError>;
}
