//! Provider configuration
//!
//! The experiment runner selects a backend from a single `--model-client`
//! string; keys and URLs come from the environment.

use std::env;
use std::sync::Arc;
use thiserror::Error;

use crate::mock::MockProvider;
use crate::ollama::OllamaProvider;
use crate::openai::OpenAiProvider;
use crate::provider::LlmProvider;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Unrecognized model client: {0}")]
    UnknownClient(String),
}

/// Environment-derived provider settings.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// OpenAI API key (env: OPENAI_API_KEY)
    pub openai_api_key: Option<String>,
    /// Ollama base URL (env: OLLAMA_URL, default http://localhost:11434)
    pub ollama_url: String,
}

impl LlmConfig {
    pub fn from_env() -> Self {
        Self {
            openai_api_key: env::var("OPENAI_API_KEY").ok(),
            ollama_url: env::var("OLLAMA_URL")
                .unwrap_or_else(|_| "http://localhost:11434".to_string()),
        }
    }

    /// Build a provider from a model-client name.
    ///
    /// Names containing "llama" route to Ollama, names containing "gpt" to
    /// OpenAI, "mock" to the scripted mock. Anything else is a
    /// configuration error.
    pub fn build_provider(&self, model_client: &str) -> Result<Arc<dyn LlmProvider>, ConfigError> {
        if model_client.contains("llama") {
            Ok(Arc::new(OllamaProvider::with_url(
                &self.ollama_url,
                model_client,
            )))
        } else if model_client.contains("gpt") {
            let key = self
                .openai_api_key
                .as_deref()
                .ok_or_else(|| ConfigError::MissingEnvVar("OPENAI_API_KEY".to_string()))?;
            Ok(Arc::new(OpenAiProvider::new(key, model_client)))
        } else if model_client == "mock" {
            Ok(Arc::new(MockProvider::constant("TERMINATE")))
        } else {
            Err(ConfigError::UnknownClient(model_client.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routes_model_client_names() {
        let config = LlmConfig {
            openai_api_key: Some("sk-test".to_string()),
            ollama_url: "http://localhost:11434".to_string(),
        };
        assert_eq!(config.build_provider("llama3.1:70b").unwrap().name(), "ollama");
        assert_eq!(config.build_provider("gpt-4o-mini").unwrap().name(), "openai");
        assert_eq!(config.build_provider("mock").unwrap().name(), "mock");
        assert!(config.build_provider("claude").is_err());
    }

    #[test]
    fn openai_requires_key() {
        let config = LlmConfig {
            openai_api_key: None,
            ollama_url: String::new(),
        };
        assert!(matches!(
            config.build_provider("gpt-4o"),
            Err(ConfigError::MissingEnvVar(_))
        ));
    }
}
