//! Vision traits

use crate::{Classification, Result};
use async_trait::async_trait;
use std::path::Path;

/// Crop image classifier
///
/// Implementations:
/// - `HttpImageClassifier` - MobileNetV2 plant-disease model behind an HTTP sidecar
///
/// A classifier that cannot produce a label (bad image, model error) returns
/// `Error::Classification` with the reason; the pipeline degrades on it.
///
/// # Example
///
/// ```ignore
/// let classifier: Arc<dyn ImageClassifier> = Arc::new(HttpImageClassifier::new(config)?);
/// let result = classifier.classify(staged.path()).await?;
/// println!("{} ({:.2})", result.label, result.confidence);
/// ```
#[async_trait]
pub trait ImageClassifier: Send + Sync + 'static {
    /// Classify a staged image file
    async fn classify(&self, image: &Path) -> Result<Classification>;

    /// Get model name for logging
    fn model_name(&self) -> &str;
}
