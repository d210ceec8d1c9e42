//! LLM Factory - Provider Abstraction Layer
//!
//! Creates generation backends from configuration.
//!
//! ## Supported Providers
//! - **Gemini**: multimodal `generateContent` API (default)
//! - **OpenAI**: any OpenAI-compatible chat completions endpoint
//!
//! ## Example
//! ```ignore
//! let config = LlmProviderConfig::from_settings(&settings.llm)?;
//! let generator = LlmFactory::create(&config)?;
//! ```

use std::sync::Arc;
use std::time::Duration;

use agrosaathi_config::{constants::endpoints, LlmSettings};
use agrosaathi_core::ResponseGenerator;

use crate::{
    adapter::{GenerationAdapter, RetryPolicy},
    backend::{LlmBackend, OpenAIBackend, OpenAIConfig},
    gemini::{GeminiBackend, GeminiConfig},
    LlmError,
};

/// LLM provider type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LlmProvider {
    /// Google Gemini
    #[default]
    Gemini,
    /// OpenAI or any OpenAI-compatible server
    OpenAI,
}

impl LlmProvider {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "gemini" | "google" => Some(LlmProvider::Gemini),
            "openai" | "gpt" | "openai-compatible" => Some(LlmProvider::OpenAI),
            _ => None,
        }
    }
}

/// Unified LLM provider configuration
#[derive(Debug, Clone)]
pub struct LlmProviderConfig {
    /// Provider type
    pub provider: LlmProvider,
    /// API key
    pub api_key: Option<String>,
    /// API endpoint override
    pub endpoint: Option<String>,
    /// Model name or ID
    pub model: String,
    /// Maximum tokens to generate
    pub max_tokens: usize,
    /// Temperature
    pub temperature: f32,
    /// Per-request timeout
    pub timeout: Duration,
    /// Retry policy for transient failures
    pub retry: RetryPolicy,
}

impl Default for LlmProviderConfig {
    fn default() -> Self {
        Self {
            provider: LlmProvider::Gemini,
            api_key: None,
            endpoint: None,
            model: "gemini-2.0-flash".to_string(),
            max_tokens: 1024,
            temperature: 0.7,
            timeout: Duration::from_secs(60),
            retry: RetryPolicy::default(),
        }
    }
}

impl LlmProviderConfig {
    /// Build from the `llm` settings section
    pub fn from_settings(settings: &LlmSettings) -> Result<Self, LlmError> {
        let provider = LlmProvider::parse(&settings.provider).ok_or_else(|| {
            LlmError::Configuration(format!("Unknown LLM provider '{}'", settings.provider))
        })?;

        Ok(Self {
            provider,
            api_key: settings.api_key.clone(),
            endpoint: settings.endpoint.clone(),
            model: settings.model.clone(),
            max_tokens: settings.max_tokens,
            temperature: settings.temperature,
            timeout: Duration::from_secs(settings.timeout_secs),
            retry: RetryPolicy {
                max_retries: settings.max_retries,
                ..RetryPolicy::default()
            },
        })
    }

    /// Create Gemini config
    pub fn gemini(api_key: impl Into<String>) -> Self {
        Self {
            provider: LlmProvider::Gemini,
            api_key: Some(api_key.into()),
            ..Default::default()
        }
    }

    /// Create OpenAI config
    pub fn openai(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            provider: LlmProvider::OpenAI,
            api_key: Some(api_key.into()),
            model: model.into(),
            ..Default::default()
        }
    }

    /// Set model
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set endpoint
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }
}

/// Factory for creating LLM backends
pub struct LlmFactory;

impl LlmFactory {
    /// Create a `ResponseGenerator` from config (implements core trait)
    pub fn create(config: &LlmProviderConfig) -> Result<Arc<dyn ResponseGenerator>, LlmError> {
        let backend = Self::create_backend(config)?;
        tracing::info!(
            provider = ?config.provider,
            model = %config.model,
            max_retries = config.retry.max_retries,
            "Created LLM backend"
        );
        Ok(Arc::new(
            GenerationAdapter::from_arc(backend).with_retry(config.retry),
        ))
    }

    /// Create a raw LlmBackend (for low-level access)
    pub fn create_backend(config: &LlmProviderConfig) -> Result<Arc<dyn LlmBackend>, LlmError> {
        match config.provider {
            LlmProvider::Gemini => {
                let api_key = config.api_key.clone().ok_or_else(|| {
                    LlmError::Configuration("Gemini requires GEMINI_API_KEY".to_string())
                })?;

                let gemini_config = GeminiConfig {
                    endpoint: config
                        .endpoint
                        .clone()
                        .unwrap_or_else(|| endpoints::GEMINI_DEFAULT.to_string()),
                    api_key,
                    model: config.model.clone(),
                    max_tokens: config.max_tokens,
                    temperature: config.temperature,
                    timeout: config.timeout,
                };
                Ok(Arc::new(GeminiBackend::new(gemini_config)?))
            },

            LlmProvider::OpenAI => {
                let openai_config = OpenAIConfig {
                    endpoint: config
                        .endpoint
                        .clone()
                        .unwrap_or_else(|| endpoints::OPENAI_DEFAULT.to_string()),
                    api_key: config.api_key.clone().unwrap_or_default(),
                    model: config.model.clone(),
                    max_tokens: config.max_tokens,
                    temperature: config.temperature,
                    timeout: config.timeout,
                };
                Ok(Arc::new(OpenAIBackend::new(openai_config)?))
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_parse() {
        assert_eq!(LlmProvider::parse("Gemini"), Some(LlmProvider::Gemini));
        assert_eq!(LlmProvider::parse("openai"), Some(LlmProvider::OpenAI));
        assert_eq!(LlmProvider::parse("claude"), None);
    }

    #[test]
    fn test_from_settings() {
        let settings = LlmSettings {
            provider: "openai".to_string(),
            model: "llama-3.1-8b".to_string(),
            endpoint: Some("http://localhost:8000/v1".to_string()),
            api_key: None,
            max_tokens: 512,
            temperature: 0.3,
            timeout_secs: 20,
            max_retries: 4,
        };
        let config = LlmProviderConfig::from_settings(&settings).unwrap();
        assert_eq!(config.provider, LlmProvider::OpenAI);
        assert_eq!(config.timeout, Duration::from_secs(20));
        assert_eq!(config.retry.max_retries, 4);

        let generator = LlmFactory::create(&config).unwrap();
        assert_eq!(generator.model_name(), "llama-3.1-8b");
    }

    #[test]
    fn test_gemini_requires_key() {
        let config = LlmProviderConfig {
            api_key: None,
            ..Default::default()
        };
        assert!(matches!(
            LlmFactory::create_backend(&config),
            Err(LlmError::Configuration(_))
        ));

        let backend = LlmFactory::create_backend(&LlmProviderConfig::gemini("key")).unwrap();
        assert_eq!(backend.model_name(), "gemini-2.0-flash");
    }

    #[test]
    fn test_unknown_provider_rejected() {
        let settings = LlmSettings {
            provider: "bard".to_string(),
            ..LlmSettings::default()
        };
        assert!(LlmProviderConfig::from_settings(&settings).is_err());
    }
}
