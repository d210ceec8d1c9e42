//! Pass-through translator

use agrosaathi_core::{Language, Result, Translator};
use async_trait::async_trait;

/// Returns the input unchanged for every pair
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTranslator;

impl NoopTranslator {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Translator for NoopTranslator {
    async fn translate(&self, text: &str, _from: Language, _to: Language) -> Result<String> {
        Ok(text.to_string())
    }

    fn name(&self) -> &str {
        "noop"
    }
}
