//! Mock LLM provider for testing
//!
//! Turn loops are deterministic when driven by a scripted mock: cycling
//! responses reproduce a whole conversation, routed responses key replies
//! on the system prompt so each role in a team answers in character.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use crate::provider::{LlmError, LlmProvider, LlmRequest, LlmResponse};

/// A mock LLM provider that returns predefined responses.
#[derive(Debug)]
pub struct MockProvider {
    /// Name of this mock
    pub name: String,
    /// Canned responses (cycles through them)
    responses: Vec<String>,
    /// Replies keyed on a substring of the system prompt (first match wins)
    routes: Vec<(String, String)>,
    /// Current response index
    index: AtomicUsize,
}

impl MockProvider {
    /// Create a new mock provider with given responses, cycled in order.
    pub fn new(responses: Vec<String>) -> Self {
        Self {
            name: "mock".to_string(),
            responses,
            routes: Vec::new(),
            index: AtomicUsize::new(0),
        }
    }

    /// Create a mock that always returns the same response.
    pub fn constant(response: &str) -> Self {
        Self::new(vec![response.to_string()])
    }

    /// Create a mock that picks its reply by matching a substring of the
    /// request's system prompt. Falls back to `default` when nothing
    /// matches.
    pub fn routed(routes: Vec<(&str, &str)>, default: &str) -> Self {
        Self {
            name: "routed-mock".to_string(),
            responses: vec![default.to_string()],
            routes: routes
                .into_iter()
                .map(|(pat, reply)| (pat.to_string(), reply.to_string()))
                .collect(),
            index: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl LlmProvider for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn is_available(&self) -> bool {
        true
    }

    async fn complete(&self, request: LlmRequest) -> Result<LlmResponse, LlmError> {
        let start = Instant::now();

        let content = if let Some((_, reply)) = self
            .routes
            .iter()
            .find(|(pat, _)| request.system.contains(pat))
        {
            reply.clone()
        } else if self.responses.is_empty() {
            return Err(LlmError::InvalidResponse("mock has no responses".into()));
        } else {
            let idx = self.index.fetch_add(1, Ordering::Relaxed);
            self.responses[idx % self.responses.len()].clone()
        };

        Ok(LlmResponse {
            content,
            model: self.name.clone(),
            latency_ms: start.elapsed().as_millis() as u64,
        })
    }
}
