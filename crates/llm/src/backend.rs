//! LLM backend trait and the OpenAI-compatible implementation
//!
//! Backends perform exactly one HTTP exchange per call. Retries and the
//! mapping onto the core `ResponseGenerator` live in [`crate::adapter`].

use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::prompt::{Message, Role};
use crate::LlmError;

/// Image attached to the final user message
#[derive(Debug, Clone)]
pub struct ImageInput {
    pub bytes: Vec<u8>,
    /// MIME type, e.g. `image/jpeg`
    pub mime_type: String,
}

impl ImageInput {
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes,
            mime_type: mime_type.into(),
        }
    }

    /// Guess the MIME type from a file extension
    pub fn mime_for_extension(ext: &str) -> &'static str {
        match ext.to_ascii_lowercase().as_str() {
            "png" => "image/png",
            "webp" => "image/webp",
            "gif" => "image/gif",
            "heic" => "image/heic",
            "heif" => "image/heif",
            _ => "image/jpeg",
        }
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }

    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.to_base64())
    }
}

/// LLM generation result
#[derive(Debug, Clone)]
pub struct GenerationResult {
    /// Generated text
    pub text: String,
    /// Tokens generated, when the provider reports usage
    pub tokens: usize,
    /// Total generation time (ms)
    pub total_time_ms: u64,
    /// Finish reason
    pub finish_reason: FinishReason,
}

/// Finish reason
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    Stop,
    Length,
    Safety,
    Error,
}

impl FinishReason {
    pub fn from_provider(reason: Option<&str>) -> Self {
        match reason.map(|r| r.to_ascii_lowercase()).as_deref() {
            Some("length") | Some("max_tokens") => FinishReason::Length,
            Some("safety") | Some("content_filter") | Some("recitation") => FinishReason::Safety,
            _ => FinishReason::Stop,
        }
    }
}

/// LLM Backend trait
#[async_trait]
pub trait LlmBackend: Send + Sync {
    /// Generate a response
    ///
    /// `image`, when present, is attached to the last user message.
    async fn generate(
        &self,
        messages: &[Message],
        image: Option<&ImageInput>,
    ) -> Result<GenerationResult, LlmError>;

    /// Get model name
    fn model_name(&self) -> &str;
}

/// Map a non-success HTTP status onto an error
///
/// Throttling and 5xx are transient and retryable, other 4xx are not.
pub(crate) fn status_error(status: reqwest::StatusCode, body: String) -> LlmError {
    if status.is_server_error() || status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        LlmError::Network(format!("HTTP {}: {}", status, body))
    } else {
        LlmError::Api(format!("HTTP {}: {}", status, body))
    }
}

/// Configuration for OpenAI-compatible backends
#[derive(Debug, Clone)]
pub struct OpenAIConfig {
    /// API endpoint (OpenAI: https://api.openai.com/v1, Groq, vLLM, ...)
    pub endpoint: String,
    /// API key
    pub api_key: String,
    /// Model name
    pub model: String,
    /// Maximum tokens to generate
    pub max_tokens: usize,
    /// Temperature (0-2)
    pub temperature: f32,
    /// Request timeout
    pub timeout: Duration,
}

impl Default for OpenAIConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1".to_string(),
            api_key: String::new(),
            model: "gpt-4o-mini".to_string(),
            max_tokens: 1024,
            temperature: 0.7,
            timeout: Duration::from_secs(60),
        }
    }
}

impl OpenAIConfig {
    /// Create config for OpenAI
    pub fn openai(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            ..Default::default()
        }
    }

    /// Create config for local OpenAI-compatible server (vLLM, Ollama, etc.)
    pub fn local(endpoint: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: "not-needed".to_string(),
            model: model.into(),
            ..Default::default()
        }
    }
}

/// OpenAI-compatible backend
///
/// Works with:
/// - OpenAI
/// - Groq
/// - vLLM and other local servers with OpenAI-compatible APIs
pub struct OpenAIBackend {
    config: OpenAIConfig,
    client: Client,
}

impl OpenAIBackend {
    /// Create new OpenAI backend
    pub fn new(config: OpenAIConfig) -> Result<Self, LlmError> {
        let is_local = config.endpoint.starts_with("http://localhost")
            || config.endpoint.starts_with("http://127.0.0.1");
        if config.api_key.is_empty() && !is_local {
            return Err(LlmError::Configuration(
                "API key required for remote endpoints".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| LlmError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    /// Get the full API URL for chat completions
    fn chat_url(&self) -> String {
        format!("{}/chat/completions", self.config.endpoint.trim_end_matches('/'))
    }

    /// Build request headers
    fn build_headers(&self) -> reqwest::header::HeaderMap {
        use reqwest::header::HeaderValue;

        let mut headers = reqwest::header::HeaderMap::new();
        let auth_value = format!("Bearer {}", self.config.api_key);
        if let Ok(val) = HeaderValue::from_str(&auth_value) {
            headers.insert(reqwest::header::AUTHORIZATION, val);
        }
        headers.insert(
            reqwest::header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        headers
    }

    fn build_request(&self, messages: &[Message], image: Option<&ImageInput>) -> OpenAIChatRequest {
        let last_user = messages.iter().rposition(|m| m.role == Role::User);

        let openai_messages = messages
            .iter()
            .enumerate()
            .map(|(i, m)| {
                let content = match image {
                    Some(img) if Some(i) == last_user => OpenAIContent::Parts(vec![
                        OpenAIPart::Text {
                            text: m.content.clone(),
                        },
                        OpenAIPart::ImageUrl {
                            image_url: OpenAIImageUrl { url: img.data_url() },
                        },
                    ]),
                    _ => OpenAIContent::Text(m.content.clone()),
                };
                OpenAIMessage {
                    role: m.role.to_string(),
                    content,
                }
            })
            .collect();

        OpenAIChatRequest {
            model: self.config.model.clone(),
            messages: openai_messages,
            max_tokens: Some(self.config.max_tokens),
            temperature: Some(self.config.temperature),
            stream: Some(false),
        }
    }
}

#[async_trait]
impl LlmBackend for OpenAIBackend {
    async fn generate(
        &self,
        messages: &[Message],
        image: Option<&ImageInput>,
    ) -> Result<GenerationResult, LlmError> {
        let start = std::time::Instant::now();
        let request = self.build_request(messages, image);

        let response = self
            .client
            .post(self.chat_url())
            .headers(self.build_headers())
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(status_error(status, error_text));
        }

        let response: OpenAIChatResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        let choice = response
            .choices
            .first()
            .ok_or_else(|| LlmError::InvalidResponse("No choices in response".to_string()))?;

        Ok(GenerationResult {
            text: choice.message.content.clone().unwrap_or_default(),
            tokens: response.usage.map(|u| u.completion_tokens).unwrap_or(0),
            total_time_ms: start.elapsed().as_millis() as u64,
            finish_reason: FinishReason::from_provider(choice.finish_reason.as_deref()),
        })
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

// OpenAI API types
#[derive(Debug, Serialize)]
struct OpenAIChatRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stream: Option<bool>,
}

#[derive(Debug, Serialize)]
struct OpenAIMessage {
    role: String,
    content: OpenAIContent,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum OpenAIContent {
    Text(String),
    Parts(Vec<OpenAIPart>),
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum OpenAIPart {
    Text { text: String },
    ImageUrl { image_url: OpenAIImageUrl },
}

#[derive(Debug, Serialize)]
struct OpenAIImageUrl {
    url: String,
}

#[derive(Debug, Deserialize)]
struct OpenAIChatResponse {
    choices: Vec<OpenAIChoice>,
    usage: Option<OpenAIUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIUsage {
    completion_tokens: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openai_backend_creation() {
        let backend = OpenAIBackend::new(OpenAIConfig::local("http://localhost:8000/v1", "llama-3"));
        assert!(backend.is_ok());

        // Remote endpoint without key
        let backend = OpenAIBackend::new(OpenAIConfig::default());
        assert!(matches!(backend, Err(LlmError::Configuration(_))));

        let backend = OpenAIBackend::new(OpenAIConfig::openai("sk-xxx", "gpt-4o"));
        assert_eq!(backend.unwrap().model_name(), "gpt-4o");
    }

    #[test]
    fn test_openai_chat_url() {
        let backend = OpenAIBackend::new(OpenAIConfig::local("http://localhost:8000/v1/", "m")).unwrap();
        assert_eq!(backend.chat_url(), "http://localhost:8000/v1/chat/completions");
    }

    #[test]
    fn test_request_text_only() {
        let backend = OpenAIBackend::new(OpenAIConfig::openai("sk-xxx", "gpt-4o")).unwrap();
        let request = backend.build_request(
            &[Message::system("sys"), Message::user("hello")],
            None,
        );
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "hello");
        assert_eq!(json["stream"], false);
    }

    #[test]
    fn test_request_attaches_image_to_last_user_message() {
        let backend = OpenAIBackend::new(OpenAIConfig::openai("sk-xxx", "gpt-4o")).unwrap();
        let image = ImageInput::new(vec![1, 2, 3], "image/png");
        let request = backend.build_request(
            &[
                Message::user("earlier"),
                Message::assistant("reply"),
                Message::user("look at this leaf"),
            ],
            Some(&image),
        );
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["messages"][0]["content"], "earlier");
        let parts = json["messages"][2]["content"].as_array().unwrap();
        assert_eq!(parts[0]["type"], "text");
        assert_eq!(parts[0]["text"], "look at this leaf");
        assert_eq!(parts[1]["type"], "image_url");
        assert_eq!(parts[1]["image_url"]["url"], "data:image/png;base64,AQID");
    }

    #[test]
    fn test_status_error_classification() {
        let err = status_error(reqwest::StatusCode::SERVICE_UNAVAILABLE, "busy".into());
        assert!(matches!(err, LlmError::Network(_)));
        let err = status_error(reqwest::StatusCode::TOO_MANY_REQUESTS, "slow down".into());
        assert!(matches!(err, LlmError::Network(_)));
        let err = status_error(reqwest::StatusCode::BAD_REQUEST, "bad".into());
        assert!(matches!(err, LlmError::Api(_)));
    }

    #[test]
    fn test_mime_guess() {
        assert_eq!(ImageInput::mime_for_extension("PNG"), "image/png");
        assert_eq!(ImageInput::mime_for_extension("jpg"), "image/jpeg");
        assert_eq!(ImageInput::mime_for_extension("bin"), "image/jpeg");
    }

    #[test]
    fn test_finish_reason_mapping() {
        assert_eq!(FinishReason::from_provider(Some("STOP")), FinishReason::Stop);
        assert_eq!(FinishReason::from_provider(Some("MAX_TOKENS")), FinishReason::Length);
        assert_eq!(FinishReason::from_provider(Some("SAFETY")), FinishReason::Safety);
        assert_eq!(FinishReason::from_provider(None), FinishReason::Stop);
    }
}
