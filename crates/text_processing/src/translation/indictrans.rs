//! IndicTrans2 HTTP sidecar
//!
//! `POST {endpoint}/translate` with FLORES-200 language tags:
//!
//! ```json
//! {"text": "...", "src_lang": "hin_Deva", "tgt_lang": "eng_Latn"}
//! ```
//!
//! The sidecar answers `{"translation": "..."}`.

use agrosaathi_core::{Language, Result, Translator};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::TextProcessingError;

#[derive(Debug, Serialize)]
struct TranslateRequest<'a> {
    text: &'a str,
    src_lang: &'static str,
    tgt_lang: &'static str,
}

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    translation: String,
}

/// Translator backed by an IndicTrans2 sidecar
pub struct IndicTransTranslator {
    client: reqwest::Client,
    endpoint: String,
}

impl IndicTransTranslator {
    pub fn new(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    async fn request(&self, text: &str, from: Language, to: Language) -> crate::Result<String> {
        let url = format!("{}/translate", self.endpoint);
        let body = TranslateRequest {
            text,
            src_lang: from.flores_code(),
            tgt_lang: to.flores_code(),
        };

        let response = self.client.post(&url).json(&body).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TextProcessingError::Translation(format!(
                "HTTP {}: {}",
                status, body
            )));
        }

        let parsed: TranslateResponse = response
            .json()
            .await
            .map_err(|e| TextProcessingError::InvalidResponse(e.to_string()))?;
        Ok(parsed.translation)
    }
}

#[async_trait]
impl Translator for IndicTransTranslator {
    async fn translate(&self, text: &str, from: Language, to: Language) -> Result<String> {
        if from == to || text.trim().is_empty() {
            return Ok(text.to_string());
        }
        if !self.supports_pair(from, to) {
            return Err(TextProcessingError::UnsupportedPair {
                from: from.code().to_string(),
                to: to.code().to_string(),
            }
            .into());
        }

        tracing::debug!(
            src = from.flores_code(),
            tgt = to.flores_code(),
            "Translating via IndicTrans2"
        );
        Ok(self.request(text, from, to).await?)
    }

    /// IndicTrans2 models translate to or from English only
    fn supports_pair(&self, from: Language, to: Language) -> bool {
        from.is_english() || to.is_english()
    }

    fn name(&self) -> &str {
        "indictrans2"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn translator() -> IndicTransTranslator {
        IndicTransTranslator::new(reqwest::Client::new(), "http://127.0.0.1:1")
    }

    #[test]
    fn test_request_uses_flores_tags() {
        let body = TranslateRequest {
            text: "hello",
            src_lang: Language::Kannada.flores_code(),
            tgt_lang: Language::English.flores_code(),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["src_lang"], "kan_Knda");
        assert_eq!(json["tgt_lang"], "eng_Latn");
    }

    #[test]
    fn test_supports_english_pivot_only() {
        let t = translator();
        assert!(t.supports_pair(Language::Hindi, Language::English));
        assert!(t.supports_pair(Language::English, Language::Tamil));
        assert!(!t.supports_pair(Language::Hindi, Language::Tamil));
    }

    #[tokio::test]
    async fn test_indic_to_indic_rejected() {
        let err = translator()
            .translate("नमस्ते", Language::Hindi, Language::Marathi)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "translation");
    }
}
