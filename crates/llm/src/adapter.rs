//! Generation adapter
//!
//! Bridges an [`LlmBackend`] to the core `ResponseGenerator` trait: builds
//! the AgroSaathi prompt, loads the staged image, retries transient
//! failures and rejects empty answers.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use agrosaathi_core::{Error, GenerationRequest, ResponseGenerator, Result};

use crate::backend::{GenerationResult, ImageInput, LlmBackend};
use crate::prompt::{Message, PromptBuilder};
use crate::LlmError;

/// Retry policy for transient failures
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Maximum retry attempts after the first call
    pub max_retries: u32,
    /// Initial backoff duration (doubles each retry)
    pub initial_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            initial_backoff: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            initial_backoff: Duration::ZERO,
        }
    }
}

/// Adapter that wraps an LlmBackend to implement `ResponseGenerator`
///
/// # Example
///
/// ```ignore
/// let backend = GeminiBackend::new(GeminiConfig::new(api_key))?;
/// let generator: Arc<dyn ResponseGenerator> = Arc::new(GenerationAdapter::new(backend));
/// ```
pub struct GenerationAdapter {
    backend: Arc<dyn LlmBackend>,
    model_name: String,
    retry: RetryPolicy,
}

impl GenerationAdapter {
    /// Create a new adapter wrapping an LlmBackend
    pub fn new<B: LlmBackend + 'static>(backend: B) -> Self {
        Self::from_arc(Arc::new(backend))
    }

    /// Create from an Arc'd backend
    pub fn from_arc(backend: Arc<dyn LlmBackend>) -> Self {
        let model_name = backend.model_name().to_string();
        Self {
            backend,
            model_name,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    fn build_messages(request: &GenerationRequest) -> Vec<Message> {
        PromptBuilder::agrosaathi()
            .with_history(&request.history)
            .user_query(&request.context, &request.auxiliary_info, &request.query)
            .build()
    }

    /// Read the staged image; an unreadable image is dropped, not fatal
    async fn load_image(path: &Path) -> Option<ImageInput> {
        match tokio::fs::read(path).await {
            Ok(bytes) if !bytes.is_empty() => {
                let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
                Some(ImageInput::new(bytes, ImageInput::mime_for_extension(ext)))
            },
            Ok(_) => {
                tracing::warn!(path = %path.display(), "Staged image is empty, generating without it");
                None
            },
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to read staged image, generating without it");
                None
            },
        }
    }

    /// Check if an error is retryable
    fn is_retryable(error: &LlmError) -> bool {
        matches!(error, LlmError::Network(_) | LlmError::Timeout)
    }

    async fn generate_with_retry(
        &self,
        messages: &[Message],
        image: Option<&ImageInput>,
    ) -> std::result::Result<GenerationResult, LlmError> {
        let mut last_error = None;
        let mut backoff = self.retry.initial_backoff;

        for attempt in 0..=self.retry.max_retries {
            if attempt > 0 {
                tracing::warn!(
                    "LLM request failed, retrying in {:?} (attempt {}/{})",
                    backoff,
                    attempt,
                    self.retry.max_retries
                );
                tokio::time::sleep(backoff).await;
                backoff *= 2;
            }

            match self.backend.generate(messages, image).await {
                Ok(result) => return Ok(result),
                Err(e) if Self::is_retryable(&e) => last_error = Some(e),
                Err(e) => return Err(e),
            }
        }

        Err(last_error.unwrap_or_else(|| LlmError::Network("Max retries exceeded".to_string())))
    }
}

#[async_trait]
impl ResponseGenerator for GenerationAdapter {
    async fn generate(&self, request: GenerationRequest) -> Result<String> {
        let messages = Self::build_messages(&request);
        let image = match request.image.as_deref() {
            Some(path) => Self::load_image(path).await,
            None => None,
        };

        let result = self
            .generate_with_retry(&messages, image.as_ref())
            .await
            .map_err(|e| Error::Generation(format!("LLM generation failed: {}", e)))?;

        let text = result.text.trim();
        if text.is_empty() {
            return Err(Error::Generation("LLM returned an empty answer".to_string()));
        }

        tracing::debug!(
            model = %self.model_name,
            tokens = result.tokens,
            total_ms = result.total_time_ms,
            finish_reason = ?result.finish_reason,
            with_image = image.is_some(),
            "Generated answer"
        );
        Ok(text.to_string())
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}
