//! Configuration management for the AgroSaathi backend
//!
//! Supports loading configuration from:
//! - YAML files (`config/default.yaml`, `config/{env}.yaml`)
//! - Environment variables (`AGROSAATHI__` prefix, `__` separator)
//! - Conventional provider variables (`GEMINI_API_KEY`, `GROQ_API_KEY`,
//!   `WEATHER_API_KEY`, `AGRI_NEWS_API_KEY`) as defaults for credentials

pub mod constants;
pub mod settings;

pub use settings::{
    load_settings, EmbeddingProviderKind, IntegrationsConfig, LlmSettings, ObservabilityConfig,
    PassageStoreKind, PipelineSettings, RagSettings, RuntimeEnvironment, ServerConfig, Settings, StagingConfig, SttSettings,
    TranslationSettings, TtsSettings, VisionSettings,
};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}
