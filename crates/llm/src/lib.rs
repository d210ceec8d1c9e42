//! Answer generation for the AgroSaathi assistant
//!
//! Features:
//! - Gemini and OpenAI-compatible chat backends
//! - Multimodal requests (crop photo attached to the final user turn)
//! - Prompt assembly from history, retrieved context and image analysis
//! - Retry with exponential backoff for transient failures

pub mod adapter;
pub mod backend;
pub mod factory;
pub mod gemini;
pub mod prompt;

pub use adapter::{GenerationAdapter, RetryPolicy};
pub use backend::{
    FinishReason, GenerationResult, ImageInput, LlmBackend, OpenAIBackend, OpenAIConfig,
};
pub use factory::{LlmFactory, LlmProvider, LlmProviderConfig};
pub use gemini::{GeminiBackend, GeminiConfig};
pub use prompt::{Message, PromptBuilder, Role, AGROSAATHI_SYSTEM_PROMPT};

use thiserror::Error;

/// LLM errors
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("API error: {0}")]
    Api(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Response blocked: {0}")]
    Blocked(String),

    #[error("Timeout")]
    Timeout,

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LlmError::Timeout
        } else {
            LlmError::Network(err.to_string())
        }
    }
}

impl From<LlmError> for agrosaathi_core::Error {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::Configuration(msg) => agrosaathi_core::Error::Config(msg),
            other => agrosaathi_core::Error::Generation(other.to_string()),
        }
    }
}
