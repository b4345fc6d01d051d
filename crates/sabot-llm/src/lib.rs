//! # Sabot LLM
//!
//! Reasoning backends for sabot agents.
//!
//! | Provider | Type | Key Required |
//! |----------|------|--------------|
//! | OpenAI | API | `OPENAI_API_KEY` |
//! | Ollama | Local | None |
//! | Mock | Testing | None |
//!
//! Every participant turn and the model-based fallback speaker selection go
//! through the [`LlmProvider`] trait, so a whole experiment can run against
//! the scripted [`MockProvider`] in tests.

pub mod config;
pub mod mock;
pub mod ollama;
pub mod openai;
pub mod provider;

pub use config::LlmConfig;
pub use mock::MockProvider;
pub use ollama::OllamaProvider;
pub use openai::OpenAiProvider;
pub use provider::{LlmError, LlmProvider, LlmRequest, LlmResponse};
