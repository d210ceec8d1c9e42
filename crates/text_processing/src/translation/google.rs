//! Google translation endpoint (`client=gtx`)
//!
//! Response shape: `[[["<translated>", "<source>", ...], ...], ...]`.
//! Long inputs come back split into several segments which are
//! concatenated in order.

use agrosaathi_core::{Language, Result, Translator};
use async_trait::async_trait;
use serde_json::Value;

use crate::TextProcessingError;

/// Translator backed by the public Google translation endpoint
pub struct GoogleTranslator {
    client: reqwest::Client,
    endpoint: String,
}

impl GoogleTranslator {
    pub fn new(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    async fn request(&self, text: &str, from: Language, to: Language) -> crate::Result<String> {
        let url = format!("{}/translate_a/single", self.endpoint);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("client", "gtx"),
                ("sl", from.translate_code()),
                ("tl", to.translate_code()),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TextProcessingError::Translation(format!(
                "HTTP {}: {}",
                status, body
            )));
        }

        let value: Value = response.json().await?;
        parse_gtx_response(&value).ok_or_else(|| {
            TextProcessingError::InvalidResponse("missing translated segments".to_string())
        })
    }
}

/// Concatenate the translated segments of a gtx response
pub(crate) fn parse_gtx_response(value: &Value) -> Option<String> {
    let segments = value.get(0)?.as_array()?;
    let translated: String = segments
        .iter()
        .filter_map(|segment| segment.get(0).and_then(Value::as_str))
        .collect();

    if translated.is_empty() {
        None
    } else {
        Some(translated)
    }
}

#[async_trait]
impl Translator for GoogleTranslator {
    async fn translate(&self, text: &str, from: Language, to: Language) -> Result<String> {
        if from == to || text.trim().is_empty() {
            return Ok(text.to_string());
        }

        tracing::debug!(from = %from, to = %to, chars = text.len(), "Translating via Google");
        Ok(self.request(text, from, to).await?)
    }

    fn name(&self) -> &str {
        "google"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_single_segment() {
        let value = json!([[["Yellow leaves on tomato", "टमाटर पर पीले पत्ते", null, null, 10]], null, "hi"]);
        assert_eq!(
            parse_gtx_response(&value).as_deref(),
            Some("Yellow leaves on tomato")
        );
    }

    #[test]
    fn test_parse_concatenates_segments() {
        let value = json!([
            [["Spray neem oil. ", "नीम का तेल छिड़कें। "], ["Repeat weekly.", "हर हफ्ते दोहराएं।"]],
            null,
            "hi"
        ]);
        assert_eq!(
            parse_gtx_response(&value).as_deref(),
            Some("Spray neem oil. Repeat weekly.")
        );
    }

    #[test]
    fn test_parse_rejects_unexpected_shape() {
        assert!(parse_gtx_response(&json!({"error": "quota"})).is_none());
        assert!(parse_gtx_response(&json!([[]])).is_none());
        assert!(parse_gtx_response(&json!(null)).is_none());
    }

    #[tokio::test]
    async fn test_blank_text_is_not_sent() {
        let translator = GoogleTranslator::new(reqwest::Client::new(), "http://127.0.0.1:1");
        let out = translator
            .translate("  ", Language::Hindi, Language::English)
            .await
            .unwrap();
        assert_eq!(out, "  ");
    }
}
