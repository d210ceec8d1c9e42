//! Text processing traits

use crate::{Language, Result};
use async_trait::async_trait;

/// Translation interface
///
/// Implementations:
/// - `GoogleTranslator` - Public Google translation endpoint
/// - `IndicTransTranslator` - IndicTrans2 HTTP sidecar
/// - `NoopTranslator` - Pass-through
///
/// Supports the pivot-language pattern: user text is translated to English,
/// reasoned over, and the answer translated back.
///
/// # Example
///
/// ```ignore
/// let translator: Arc<dyn Translator> = create_translator(&config);
/// let english = translator.translate(
///     "मेरे टमाटर के पत्ते पीले हैं",
///     Language::Hindi,
///     Language::English
/// ).await?;
/// ```
#[async_trait]
pub trait Translator: Send + Sync + 'static {
    /// Translate text between languages
    ///
    /// Implementations must return the input unchanged, without any
    /// external call, when `from == to`.
    ///
    /// # Arguments
    /// * `text` - Text to translate
    /// * `from` - Source language
    /// * `to` - Target language
    ///
    /// # Returns
    /// Translated text, or `Error::Translation`
    async fn translate(&self, text: &str, from: Language, to: Language) -> Result<String>;

    /// Check if translation pair is supported
    fn supports_pair(&self, from: Language, to: Language) -> bool {
        let _ = (from, to);
        true
    }

    /// Get translator name
    fn name(&self) -> &str;
}
