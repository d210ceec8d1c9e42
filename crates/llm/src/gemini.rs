//! Gemini backend (`generateContent` REST API)
//!
//! System messages become `system_instruction`, assistant turns are sent
//! with the `model` role, and an attached image travels as `inline_data`
//! next to the text of the last user turn.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::backend::{status_error, FinishReason, GenerationResult, ImageInput, LlmBackend};
use crate::prompt::{Message, Role};
use crate::LlmError;

/// Gemini configuration
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// API base URL
    pub endpoint: String,
    /// API key
    pub api_key: String,
    /// Model name
    pub model: String,
    /// Maximum output tokens
    pub max_tokens: usize,
    /// Temperature
    pub temperature: f32,
    /// Request timeout
    pub timeout: Duration,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            api_key: String::new(),
            model: "gemini-2.0-flash".to_string(),
            max_tokens: 1024,
            temperature: 0.7,
            timeout: Duration::from_secs(60),
        }
    }
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Default::default()
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

/// Gemini backend
pub struct GeminiBackend {
    config: GeminiConfig,
    client: Client,
}

impl GeminiBackend {
    pub fn new(config: GeminiConfig) -> Result<Self, LlmError> {
        if config.api_key.trim().is_empty() {
            return Err(LlmError::Configuration(
                "Gemini requires GEMINI_API_KEY".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| LlmError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    fn generate_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.endpoint.trim_end_matches('/'),
            self.config.model
        )
    }

    fn build_request(&self, messages: &[Message], image: Option<&ImageInput>) -> GeminiRequest {
        let system_text: Vec<&str> = messages
            .iter()
            .filter(|m| m.role == Role::System)
            .map(|m| m.content.as_str())
            .collect();

        let system_instruction = if system_text.is_empty() {
            None
        } else {
            Some(GeminiContent {
                role: None,
                parts: vec![GeminiPart::Text {
                    text: system_text.join("\n\n"),
                }],
            })
        };

        let conversation: Vec<&Message> =
            messages.iter().filter(|m| m.role != Role::System).collect();
        let last_user = conversation.iter().rposition(|m| m.role == Role::User);

        let contents = conversation
            .iter()
            .enumerate()
            .map(|(i, m)| {
                let mut parts = vec![GeminiPart::Text {
                    text: m.content.clone(),
                }];
                if let Some(img) = image.filter(|_| Some(i) == last_user) {
                    parts.push(GeminiPart::InlineData {
                        inline_data: GeminiBlob {
                            mime_type: img.mime_type.clone(),
                            data: img.to_base64(),
                        },
                    });
                }
                GeminiContent {
                    role: Some(gemini_role(m.role).to_string()),
                    parts,
                }
            })
            .collect();

        GeminiRequest {
            system_instruction,
            contents,
            generation_config: GeminiGenerationConfig {
                temperature: self.config.temperature,
                max_output_tokens: self.config.max_tokens,
            },
        }
    }
}

fn gemini_role(role: Role) -> &'static str {
    match role {
        Role::Assistant => "model",
        _ => "user",
    }
}

/// Extract text from the first candidate
fn parse_response(response: GeminiResponse) -> Result<(String, FinishReason, usize), LlmError> {
    let tokens = response
        .usage_metadata
        .and_then(|u| u.candidates_token_count)
        .unwrap_or(0);

    let Some(candidate) = response.candidates.into_iter().next() else {
        let reason = response
            .prompt_feedback
            .and_then(|f| f.block_reason)
            .unwrap_or_else(|| "no candidates".to_string());
        return Err(LlmError::Blocked(reason));
    };

    let finish_reason = FinishReason::from_provider(candidate.finish_reason.as_deref());
    let text: String = candidate
        .content
        .map(|c| {
            c.parts
                .into_iter()
                .filter_map(|p| p.text)
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();

    if text.trim().is_empty() && finish_reason == FinishReason::Safety {
        return Err(LlmError::Blocked("safety".to_string()));
    }
    Ok((text, finish_reason, tokens))
}

#[async_trait]
impl LlmBackend for GeminiBackend {
    async fn generate(
        &self,
        messages: &[Message],
        image: Option<&ImageInput>,
    ) -> Result<GenerationResult, LlmError> {
        let start = std::time::Instant::now();
        let request = self.build_request(messages, image);

        let response = self
            .client
            .post(self.generate_url())
            .header("x-goog-api-key", &self.config.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(status_error(status, error_text));
        }

        let response: GeminiResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;
        let (text, finish_reason, tokens) = parse_response(response)?;

        Ok(GenerationResult {
            text,
            tokens,
            total_time_ms: start.elapsed().as_millis() as u64,
            finish_reason,
        })
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

// Gemini API types
#[derive(Debug, Serialize)]
struct GeminiRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    contents: Vec<GeminiContent>,
    #[serde(rename = "generationConfig")]
    generation_config: GeminiGenerationConfig,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum GeminiPart {
    Text { text: String },
    InlineData { inline_data: GeminiBlob },
}

#[derive(Debug, Serialize)]
struct GeminiBlob {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    temperature: f32,
    max_output_tokens: usize,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    prompt_feedback: Option<GeminiPromptFeedback>,
    usage_metadata: Option<GeminiUsage>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    content: Option<GeminiResponseContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponseContent {
    #[serde(default)]
    parts: Vec<GeminiResponsePart>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsage {
    candidates_token_count: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn backend() -> GeminiBackend {
        GeminiBackend::new(GeminiConfig::new("test-key")).unwrap()
    }

    #[test]
    fn test_requires_api_key() {
        assert!(matches!(
            GeminiBackend::new(GeminiConfig::default()),
            Err(LlmError::Configuration(_))
        ));
    }

    #[test]
    fn test_generate_url() {
        let b = GeminiBackend::new(GeminiConfig::new("k").with_model("gemini-1.5-pro")).unwrap();
        assert_eq!(
            b.generate_url(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-pro:generateContent"
        );
    }

    #[test]
    fn test_request_shape() {
        let messages = vec![
            Message::system("You are AgroSaathi"),
            Message::user("hi"),
            Message::assistant("hello"),
            Message::user("my wheat has rust"),
        ];
        let image = ImageInput::new(vec![0xff, 0xd8], "image/jpeg");
        let json = serde_json::to_value(backend().build_request(&messages, Some(&image))).unwrap();

        assert_eq!(json["system_instruction"]["parts"][0]["text"], "You are AgroSaathi");
        assert!(json["system_instruction"].get("role").is_none());

        let contents = json["contents"].as_array().unwrap();
        assert_eq!(contents.len(), 3);
        assert_eq!(contents[1]["role"], "model");
        assert_eq!(contents[0]["parts"].as_array().unwrap().len(), 1);

        let last = &contents[2]["parts"];
        assert_eq!(last[0]["text"], "my wheat has rust");
        assert_eq!(last[1]["inline_data"]["mime_type"], "image/jpeg");
        assert_eq!(last[1]["inline_data"]["data"], "/9g=");

        assert_eq!(json["generationConfig"]["maxOutputTokens"], 1024);
    }

    #[test]
    fn test_parse_candidates() {
        let response: GeminiResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": {"parts": [{"text": "Spray "}, {"text": "copper fungicide."}], "role": "model"},
                "finishReason": "STOP"
            }],
            "usageMetadata": {"candidatesTokenCount": 7}
        }))
        .unwrap();
        let (text, reason, tokens) = parse_response(response).unwrap();
        assert_eq!(text, "Spray copper fungicide.");
        assert_eq!(reason, FinishReason::Stop);
        assert_eq!(tokens, 7);
    }

    #[test]
    fn test_parse_blocked_prompt() {
        let response: GeminiResponse = serde_json::from_value(json!({
            "promptFeedback": {"blockReason": "SAFETY"}
        }))
        .unwrap();
        assert!(matches!(parse_response(response), Err(LlmError::Blocked(r)) if r == "SAFETY"));
    }
}
