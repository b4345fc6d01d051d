//! The provider seam between agents and model backends
//!
//! Every participant holds an `Arc<dyn LlmProvider>`; a turn is one
//! `complete` call carrying the role's system message and the rendered
//! conversation. `ask` is the bare variant the runner uses for fallback
//! speaker selection. Swapping the backend never touches the automaton.

use async_trait::async_trait;
use thiserror::Error;

/// Errors from model backends.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("connection failed: {0}")]
    ConnectionFailed(String),
    #[error("request failed: {0}")]
    RequestFailed(String),
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// One completion request.
#[derive(Debug, Clone)]
pub struct LlmRequest {
    /// System message establishing the speaking role
    pub system: String,
    /// Rendered conversation plus the turn instruction
    pub prompt: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl LlmRequest {
    /// A request with no particular role, used for moderation prompts.
    pub fn simple(prompt: &str) -> Self {
        Self::with_role("You are a helpful assistant.", prompt)
    }

    /// A request spoken in the role established by `system`.
    pub fn with_role(system: &str, prompt: &str) -> Self {
        Self {
            system: system.to_string(),
            prompt: prompt.to_string(),
            temperature: 0.7,
            max_tokens: 1024,
        }
    }
}

/// One completion, with the metadata the turn loop logs per dispatch.
#[derive(Debug, Clone)]
pub struct LlmResponse {
    pub content: String,
    /// Model that actually served the request
    pub model: String,
    pub latency_ms: u64,
}

/// A model backend capable of serving agent turns.
#[async_trait]
pub trait LlmProvider: Send + Sync + std::fmt::Debug {
    fn name(&self) -> &str;

    /// Cheap reachability check, run once before an experiment starts.
    async fn is_available(&self) -> bool;

    async fn complete(&self, request: LlmRequest) -> Result<LlmResponse, LlmError>;

    /// Plain-prompt completion returning only the text.
    async fn ask(&self, prompt: &str) -> Result<String, LlmError> {
        let response = self.complete(LlmRequest::simple(prompt)).await?;
        Ok(response.content)
    }
}
