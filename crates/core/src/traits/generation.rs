//! Answer generation traits

use crate::{Result, Turn};
use async_trait::async_trait;
use std::path::PathBuf;

/// Everything the generation stage sees for one request
#[derive(Debug, Clone, Default)]
pub struct GenerationRequest {
    /// Rendered knowledge-base context (or the empty-context sentinel)
    pub context: String,
    /// Classification-derived sentence, e.g. `Detected Class: ...`
    pub auxiliary_info: String,
    /// User query in English
    pub query: String,
    /// Staged image to attach, if the request carried one
    pub image: Option<PathBuf>,
    /// Prior turns in English, oldest first
    pub history: Vec<Turn>,
}

impl GenerationRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = context.into();
        self
    }

    pub fn with_auxiliary_info(mut self, info: impl Into<String>) -> Self {
        self.auxiliary_info = info.into();
        self
    }

    pub fn with_image(mut self, image: Option<PathBuf>) -> Self {
        self.image = image;
        self
    }

    pub fn with_history(mut self, history: Vec<Turn>) -> Self {
        self.history = history;
        self
    }
}

/// Answer generator
///
/// Implementations:
/// - `GenerationAdapter` - Wraps an LLM backend (Gemini, OpenAI-compatible)
///
/// # Example
///
/// ```ignore
/// let generator: Arc<dyn ResponseGenerator> = Arc::new(GenerationAdapter::new(backend));
/// let answer = generator.generate(GenerationRequest::new("How do I treat leaf curl?")).await?;
/// ```
#[async_trait]
pub trait ResponseGenerator: Send + Sync + 'static {
    /// Produce an English answer
    ///
    /// Failures are reported as `Error::Generation`.
    async fn generate(&self, request: GenerationRequest) -> Result<String>;

    /// Get model name for logging
    fn model_name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builder() {
        let req = GenerationRequest::new("why are leaves yellow")
            .with_context("ctx")
            .with_auxiliary_info("No image provided.")
            .with_history(vec![Turn::user("hello")]);
        assert_eq!(req.query, "why are leaves yellow");
        assert_eq!(req.context, "ctx");
        assert_eq!(req.auxiliary_info, "No image provided.");
        assert!(req.image.is_none());
        assert_eq!(req.history.len(), 1);
    }
}
