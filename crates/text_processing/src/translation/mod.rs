//! Translation gateways
//!
//! English is the pivot language. Every translator returns its input
//! unchanged, without touching the network, when source and target match.
//!
//! Providers:
//! - `google`: public Google translation endpoint (`client=gtx`)
//! - `indictrans`: IndicTrans2 HTTP sidecar speaking FLORES-200 tags
//! - `disabled`: pass-through

mod cache;
mod google;
mod indictrans;
mod noop;

pub use cache::CachingTranslator;
pub use google::GoogleTranslator;
pub use indictrans::IndicTransTranslator;
pub use noop::NoopTranslator;

use agrosaathi_core::Translator;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::{Result, TextProcessingError};

/// Default public translation endpoint
const GOOGLE_DEFAULT_ENDPOINT: &str = "https://translate.googleapis.com";

/// Default IndicTrans2 sidecar endpoint
const INDICTRANS_DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8091";

/// Translation providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TranslationProvider {
    /// Public Google translation endpoint
    #[default]
    Google,
    /// IndicTrans2 sidecar
    #[serde(alias = "indictrans2")]
    IndicTrans,
    /// Disabled (pass-through)
    Disabled,
}

impl TranslationProvider {
    /// Parse a provider name (case-insensitive)
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "google" | "gtx" => Some(Self::Google),
            "indictrans" | "indictrans2" => Some(Self::IndicTrans),
            "disabled" | "none" | "noop" => Some(Self::Disabled),
            _ => None,
        }
    }
}

/// Translation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationConfig {
    /// Which provider to use
    #[serde(default)]
    pub provider: TranslationProvider,
    /// Base URL override for the provider
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Per-request timeout
    #[serde(default = "default_timeout")]
    pub timeout: Duration,
    /// Cached translations kept in memory (0 disables caching)
    #[serde(default = "default_cache_size")]
    pub cache_size: usize,
}

fn default_timeout() -> Duration {
    Duration::from_secs(15)
}

fn default_cache_size() -> usize {
    512
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            provider: TranslationProvider::Google,
            endpoint: None,
            timeout: default_timeout(),
            cache_size: default_cache_size(),
        }
    }
}

impl TranslationConfig {
    fn endpoint_or(&self, fallback: &str) -> String {
        self.endpoint
            .as_deref()
            .filter(|e| !e.trim().is_empty())
            .unwrap_or(fallback)
            .trim_end_matches('/')
            .to_string()
    }
}

fn build_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| TextProcessingError::Config(format!("Failed to build HTTP client: {}", e)))
}

/// Create translator based on config
pub fn create_translator(config: &TranslationConfig) -> Result<Arc<dyn Translator>> {
    let translator: Arc<dyn Translator> = match config.provider {
        TranslationProvider::Google => {
            let endpoint = config.endpoint_or(GOOGLE_DEFAULT_ENDPOINT);
            tracing::info!(endpoint = %endpoint, "Using Google translator");
            Arc::new(GoogleTranslator::new(build_client(config.timeout)?, endpoint))
        },
        TranslationProvider::IndicTrans => {
            let endpoint = config.endpoint_or(INDICTRANS_DEFAULT_ENDPOINT);
            tracing::info!(endpoint = %endpoint, "Using IndicTrans2 translator");
            Arc::new(IndicTransTranslator::new(build_client(config.timeout)?, endpoint))
        },
        TranslationProvider::Disabled => {
            tracing::info!("Translation disabled, using pass-through");
            return Ok(Arc::new(NoopTranslator::new()));
        },
    };

    if config.cache_size == 0 {
        return Ok(translator);
    }
    Ok(Arc::new(CachingTranslator::new(translator, config.cache_size)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use agrosaathi_core::Language;

    #[test]
    fn test_provider_parse() {
        assert_eq!(TranslationProvider::parse("Google"), Some(TranslationProvider::Google));
        assert_eq!(
            TranslationProvider::parse("indictrans2"),
            Some(TranslationProvider::IndicTrans)
        );
        assert_eq!(TranslationProvider::parse("none"), Some(TranslationProvider::Disabled));
        assert_eq!(TranslationProvider::parse("bing"), None);
    }

    #[test]
    fn test_endpoint_override() {
        let config = TranslationConfig {
            endpoint: Some("http://localhost:9000/".to_string()),
            ..Default::default()
        };
        assert_eq!(config.endpoint_or(GOOGLE_DEFAULT_ENDPOINT), "http://localhost:9000");

        let config = TranslationConfig::default();
        assert_eq!(config.endpoint_or(GOOGLE_DEFAULT_ENDPOINT), GOOGLE_DEFAULT_ENDPOINT);
    }

    #[tokio::test]
    async fn test_disabled_provider_passes_through() {
        let config = TranslationConfig {
            provider: TranslationProvider::Disabled,
            ..Default::default()
        };
        let translator = create_translator(&config).unwrap();
        assert_eq!(translator.name(), "noop");

        let out = translator
            .translate("नमस्ते", Language::Hindi, Language::English)
            .await
            .unwrap();
        assert_eq!(out, "नमस्ते");
    }

    #[tokio::test]
    async fn test_same_language_skips_network() {
        // Unroutable endpoint: any network call would fail the test
        let config = TranslationConfig {
            endpoint: Some("http://127.0.0.1:1".to_string()),
            ..Default::default()
        };
        let translator = create_translator(&config).unwrap();
        let out = translator
            .translate("yellow leaves", Language::English, Language::English)
            .await
            .unwrap();
        assert_eq!(out, "yellow leaves");
    }
}
