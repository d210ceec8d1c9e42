//! Main settings module

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::constants::{endpoints, integrations, limits, models, rag, timeouts};
use crate::ConfigError;

/// Runtime environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeEnvironment {
    /// Development mode - relaxed validation, warnings only
    #[default]
    Development,
    /// Staging mode - stricter validation
    Staging,
    /// Production mode - all validations enforced
    Production,
}

impl RuntimeEnvironment {
    /// Check if this is a production environment
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    /// Check if strict validation should be applied
    pub fn is_strict(&self) -> bool {
        matches!(self, Self::Production | Self::Staging)
    }
}

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    /// Runtime environment (development, staging, production)
    #[serde(default)]
    pub environment: RuntimeEnvironment,

    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Scratch directories for uploads and generated audio
    #[serde(default)]
    pub staging: StagingConfig,

    /// Request pipeline tuning
    #[serde(default)]
    pub pipeline: PipelineSettings,

    /// Transcription gateway
    #[serde(default)]
    pub stt: SttSettings,

    /// Translation gateway
    #[serde(default)]
    pub translation: TranslationSettings,

    /// Plant-disease classifier gateway
    #[serde(default)]
    pub vision: VisionSettings,

    /// Knowledge-base retrieval
    #[serde(default)]
    pub rag: RagSettings,

    /// Answer generation
    #[serde(default)]
    pub llm: LlmSettings,

    /// Speech synthesis gateway
    #[serde(default)]
    pub tts: TtsSettings,

    /// Weather and news proxies
    #[serde(default)]
    pub integrations: IntegrationsConfig,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

/// Read a credential from a conventional environment variable
fn env_key(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn default_true() -> bool {
    true
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP server host
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Whole-request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub timeout_seconds: u64,

    /// Largest accepted request body in bytes
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,

    /// Chat requests processed concurrently
    #[serde(default = "default_max_concurrent_requests")]
    pub max_concurrent_requests: usize,

    /// How long a chat request waits for a free slot, in seconds
    #[serde(default = "default_queue_timeout")]
    pub queue_timeout_seconds: u64,

    /// Enable CORS
    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// CORS allowed origins
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    5000
}
fn default_request_timeout() -> u64 {
    timeouts::REQUEST_SECS
}
fn default_max_upload_bytes() -> usize {
    limits::MAX_UPLOAD_BYTES
}
fn default_max_concurrent_requests() -> usize {
    limits::MAX_CONCURRENT_CHATS
}
fn default_queue_timeout() -> u64 {
    30
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            timeout_seconds: default_request_timeout(),
            max_upload_bytes: default_max_upload_bytes(),
            max_concurrent_requests: default_max_concurrent_requests(),
            queue_timeout_seconds: default_queue_timeout(),
            cors_enabled: true,
            cors_origins: Vec::new(),
        }
    }
}

/// Scratch directories
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StagingConfig {
    /// Request-scoped uploads, deleted when the request ends
    #[serde(default = "default_upload_dir")]
    pub upload_dir: String,

    /// Generated audio served by `/api/audio/:filename`
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
}

fn default_upload_dir() -> String {
    "temp/uploads".to_string()
}
fn default_output_dir() -> String {
    "temp/outputs".to_string()
}

impl Default for StagingConfig {
    fn default() -> Self {
        Self {
            upload_dir: default_upload_dir(),
            output_dir: default_output_dir(),
        }
    }
}

/// Request pipeline tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSettings {
    /// Passages retrieved per request
    #[serde(default = "default_top_k")]
    pub retrieval_top_k: usize,

    /// Upper bound for the generation stage in seconds
    #[serde(default = "default_generation_timeout")]
    pub generation_timeout_secs: u64,

    /// Prior turns forwarded to the LLM
    #[serde(default = "default_max_history_turns")]
    pub max_history_turns: usize,
}

fn default_top_k() -> usize {
    rag::TOP_K
}
fn default_generation_timeout() -> u64 {
    timeouts::GENERATION_STAGE_SECS
}
fn default_max_history_turns() -> usize {
    limits::MAX_HISTORY_TURNS
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            retrieval_top_k: default_top_k(),
            generation_timeout_secs: default_generation_timeout(),
            max_history_turns: default_max_history_turns(),
        }
    }
}

/// Transcription gateway (OpenAI/Groq-compatible Whisper API)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SttSettings {
    #[serde(default = "default_stt_endpoint")]
    pub endpoint: String,

    /// Defaults to `GROQ_API_KEY`
    #[serde(default = "default_stt_api_key")]
    pub api_key: Option<String>,

    #[serde(default = "default_stt_model")]
    pub model: String,

    #[serde(default = "default_stt_timeout")]
    pub timeout_secs: u64,
}

fn default_stt_endpoint() -> String {
    endpoints::GROQ_DEFAULT.to_string()
}
fn default_stt_api_key() -> Option<String> {
    env_key("GROQ_API_KEY")
}
fn default_stt_model() -> String {
    models::WHISPER.to_string()
}
fn default_stt_timeout() -> u64 {
    timeouts::STT_SECS
}

impl Default for SttSettings {
    fn default() -> Self {
        Self {
            endpoint: default_stt_endpoint(),
            api_key: default_stt_api_key(),
            model: default_stt_model(),
            timeout_secs: default_stt_timeout(),
        }
    }
}

/// Translation gateway
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationSettings {
    /// `google`, `indictrans` or `disabled`
    #[serde(default = "default_translation_provider")]
    pub provider: String,

    /// Base URL of the selected provider
    #[serde(default)]
    pub endpoint: Option<String>,

    #[serde(default = "default_translation_timeout")]
    pub timeout_secs: u64,
}

fn default_translation_provider() -> String {
    "google".to_string()
}
fn default_translation_timeout() -> u64 {
    timeouts::TRANSLATION_SECS
}

impl Default for TranslationSettings {
    fn default() -> Self {
        Self {
            provider: default_translation_provider(),
            endpoint: None,
            timeout_secs: default_translation_timeout(),
        }
    }
}

/// Plant-disease classifier gateway
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisionSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_vision_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_vision_timeout")]
    pub timeout_secs: u64,
}

fn default_vision_endpoint() -> String {
    endpoints::VISION_DEFAULT.to_string()
}
fn default_vision_timeout() -> u64 {
    timeouts::VISION_SECS
}

impl Default for VisionSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: default_vision_endpoint(),
            timeout_secs: default_vision_timeout(),
        }
    }
}

/// Where embedded passages live
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassageStoreKind {
    Qdrant,
    /// In-process index rebuilt at startup
    Memory,
}

impl PassageStoreKind {
    /// Parse a store name (case-insensitive)
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "qdrant" => Some(Self::Qdrant),
            "memory" | "in-memory" => Some(Self::Memory),
            _ => None,
        }
    }
}

/// Which embedder turns text into vectors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbeddingProviderKind {
    Ollama,
    /// Model-free character vectors
    Hash,
}

impl EmbeddingProviderKind {
    /// Parse a provider name (case-insensitive)
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "ollama" => Some(Self::Ollama),
            "hash" | "simple" => Some(Self::Hash),
            _ => None,
        }
    }
}

/// Knowledge-base retrieval
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RagSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// `qdrant` or `memory` (in-process index rebuilt at startup)
    #[serde(default = "default_rag_store")]
    pub store: String,

    #[serde(default = "default_qdrant_endpoint")]
    pub qdrant_endpoint: String,

    #[serde(default = "default_qdrant_collection")]
    pub qdrant_collection: String,

    #[serde(default)]
    pub qdrant_api_key: Option<String>,

    /// `ollama` or `hash` (model-free character vectors for offline use)
    #[serde(default = "default_embedding_provider")]
    pub embedding_provider: String,

    #[serde(default = "default_embedding_endpoint")]
    pub embedding_endpoint: String,

    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    #[serde(default = "default_vector_dim")]
    pub vector_dim: usize,

    /// Directory scanned at startup when the collection is empty
    #[serde(default = "default_knowledge_dir")]
    pub knowledge_dir: String,

    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,

    #[serde(default = "default_min_score")]
    pub min_score: f32,
}

fn default_rag_store() -> String {
    "qdrant".to_string()
}
fn default_qdrant_endpoint() -> String {
    endpoints::QDRANT_DEFAULT.to_string()
}
fn default_qdrant_collection() -> String {
    rag::COLLECTION.to_string()
}
fn default_embedding_provider() -> String {
    "ollama".to_string()
}
fn default_embedding_endpoint() -> String {
    endpoints::OLLAMA_DEFAULT.to_string()
}
fn default_embedding_model() -> String {
    models::EMBEDDING.to_string()
}
fn default_vector_dim() -> usize {
    models::EMBEDDING_DIM
}
fn default_knowledge_dir() -> String {
    "data/knowledge".to_string()
}
fn default_chunk_size() -> usize {
    rag::CHUNK_SIZE
}
fn default_chunk_overlap() -> usize {
    rag::CHUNK_OVERLAP
}
fn default_min_score() -> f32 {
    rag::MIN_SCORE
}

impl RagSettings {
    pub fn store_kind(&self) -> Option<PassageStoreKind> {
        PassageStoreKind::parse(&self.store)
    }

    pub fn embedding_provider_kind(&self) -> Option<EmbeddingProviderKind> {
        EmbeddingProviderKind::parse(&self.embedding_provider)
    }
}

impl Default for RagSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            store: default_rag_store(),
            qdrant_endpoint: default_qdrant_endpoint(),
            qdrant_collection: default_qdrant_collection(),
            qdrant_api_key: None,
            embedding_provider: default_embedding_provider(),
            embedding_endpoint: default_embedding_endpoint(),
            embedding_model: default_embedding_model(),
            vector_dim: default_vector_dim(),
            knowledge_dir: default_knowledge_dir(),
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
            min_score: default_min_score(),
        }
    }
}

/// Answer generation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSettings {
    /// `gemini` or `openai` (any OpenAI-compatible chat endpoint)
    #[serde(default = "default_llm_provider")]
    pub provider: String,

    #[serde(default = "default_llm_model")]
    pub model: String,

    /// Overrides the provider's default base URL
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Defaults to `GEMINI_API_KEY`
    #[serde(default = "default_llm_api_key")]
    pub api_key: Option<String>,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,

    /// Retries for transient failures (network, 5xx, timeouts)
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

fn default_llm_provider() -> String {
    "gemini".to_string()
}
fn default_llm_model() -> String {
    models::GEMINI.to_string()
}
fn default_llm_api_key() -> Option<String> {
    env_key("GEMINI_API_KEY")
}
fn default_max_tokens() -> usize {
    1024
}
fn default_temperature() -> f32 {
    0.7
}
fn default_llm_timeout() -> u64 {
    timeouts::LLM_REQUEST_SECS
}
fn default_max_retries() -> u32 {
    2
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            provider: default_llm_provider(),
            model: default_llm_model(),
            endpoint: None,
            api_key: default_llm_api_key(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            timeout_secs: default_llm_timeout(),
            max_retries: default_max_retries(),
        }
    }
}

/// Speech synthesis gateway
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TtsSettings {
    #[serde(default = "default_tts_endpoint")]
    pub endpoint: String,

    /// Requested audio container (`mp3`, `wav`, `ogg`)
    #[serde(default = "default_tts_format")]
    pub format: String,

    #[serde(default = "default_tts_timeout")]
    pub timeout_secs: u64,
}

fn default_tts_endpoint() -> String {
    endpoints::TTS_DEFAULT.to_string()
}
fn default_tts_format() -> String {
    "mp3".to_string()
}
fn default_tts_timeout() -> u64 {
    timeouts::TTS_SECS
}

impl Default for TtsSettings {
    fn default() -> Self {
        Self {
            endpoint: default_tts_endpoint(),
            format: default_tts_format(),
            timeout_secs: default_tts_timeout(),
        }
    }
}

/// Weather and news proxies
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntegrationsConfig {
    /// Defaults to `WEATHER_API_KEY`
    #[serde(default = "default_weather_api_key")]
    pub weather_api_key: Option<String>,

    #[serde(default = "default_weather_endpoint")]
    pub weather_endpoint: String,

    /// Defaults to `AGRI_NEWS_API_KEY`
    #[serde(default = "default_news_api_key")]
    pub news_api_key: Option<String>,

    #[serde(default = "default_news_endpoint")]
    pub news_endpoint: String,

    #[serde(default = "default_news_query")]
    pub news_query: String,

    #[serde(default = "default_news_page_size")]
    pub news_page_size: u32,

    #[serde(default = "default_integration_timeout")]
    pub timeout_secs: u64,
}

fn default_weather_api_key() -> Option<String> {
    env_key("WEATHER_API_KEY")
}
fn default_weather_endpoint() -> String {
    endpoints::OPENWEATHER_DEFAULT.to_string()
}
fn default_news_api_key() -> Option<String> {
    env_key("AGRI_NEWS_API_KEY")
}
fn default_news_endpoint() -> String {
    endpoints::NEWSAPI_DEFAULT.to_string()
}
fn default_news_query() -> String {
    integrations::NEWS_QUERY.to_string()
}
fn default_news_page_size() -> u32 {
    integrations::NEWS_PAGE_SIZE
}
fn default_integration_timeout() -> u64 {
    timeouts::INTEGRATION_SECS
}

impl Default for IntegrationsConfig {
    fn default() -> Self {
        Self {
            weather_api_key: default_weather_api_key(),
            weather_endpoint: default_weather_endpoint(),
            news_api_key: default_news_api_key(),
            news_endpoint: default_news_endpoint(),
            news_query: default_news_query(),
            news_page_size: default_news_page_size(),
            timeout_secs: default_integration_timeout(),
        }
    }
}

/// Observability configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default)]
    pub log_json: bool,

    /// Enable Prometheus metrics
    #[serde(default = "default_true")]
    pub metrics_enabled: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_json: false,
            metrics_enabled: true,
        }
    }
}

fn invalid(field: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        message: message.into(),
    }
}

impl Settings {
    /// Create default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_server()?;
        self.validate_pipeline()?;
        self.validate_rag()?;
        self.validate_llm()?;
        self.validate_credentials()?;
        Ok(())
    }

    /// Longest a chat request can take when every gateway runs to its timeout
    ///
    /// Queue wait, transcription, translation both ways, classification when
    /// enabled, the generation stage and synthesis.
    pub fn chat_budget_secs(&self) -> u64 {
        let vision = if self.vision.enabled {
            self.vision.timeout_secs
        } else {
            0
        };
        self.server.queue_timeout_seconds
            + self.stt.timeout_secs
            + 2 * self.translation.timeout_secs
            + vision
            + self.pipeline.generation_timeout_secs
            + self.tts.timeout_secs
    }

    fn validate_server(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(invalid("server.port", "Port must be non-zero"));
        }
        if self.server.max_upload_bytes == 0 {
            return Err(invalid("server.max_upload_bytes", "Must be greater than 0"));
        }
        if self.server.max_concurrent_requests == 0 {
            return Err(invalid(
                "server.max_concurrent_requests",
                "Must be greater than 0",
            ));
        }
        if self.server.timeout_seconds == 0 {
            return Err(invalid("server.timeout_seconds", "Must be greater than 0"));
        }
        if self.staging.upload_dir.trim().is_empty() || self.staging.output_dir.trim().is_empty() {
            return Err(invalid("staging", "Upload and output directories are required"));
        }
        if self.staging.upload_dir == self.staging.output_dir {
            return Err(invalid(
                "staging.output_dir",
                "Must differ from staging.upload_dir",
            ));
        }
        Ok(())
    }

    fn validate_pipeline(&self) -> Result<(), ConfigError> {
        let pipeline = &self.pipeline;

        if !(1..=20).contains(&pipeline.retrieval_top_k) {
            return Err(invalid(
                "pipeline.retrieval_top_k",
                format!("Must be between 1 and 20, got {}", pipeline.retrieval_top_k),
            ));
        }
        if pipeline.generation_timeout_secs == 0 {
            return Err(invalid(
                "pipeline.generation_timeout_secs",
                "Must be greater than 0",
            ));
        }
        if pipeline.generation_timeout_secs >= self.server.timeout_seconds {
            return Err(invalid(
                "pipeline.generation_timeout_secs",
                format!(
                    "Must be shorter than server.timeout_seconds ({})",
                    self.server.timeout_seconds
                ),
            ));
        }
        let budget = self.chat_budget_secs();
        if budget >= self.server.timeout_seconds {
            return Err(invalid(
                "server.timeout_seconds",
                format!(
                    "Must exceed the worst-case chat budget of {}s (queue wait plus every stage timeout), got {}",
                    budget, self.server.timeout_seconds
                ),
            ));
        }
        Ok(())
    }

    fn validate_rag(&self) -> Result<(), ConfigError> {
        let rag = &self.rag;

        if rag.store_kind().is_none() {
            return Err(invalid(
                "rag.store",
                format!("Unknown store '{}', expected qdrant or memory", rag.store),
            ));
        }
        if rag.embedding_provider_kind().is_none() {
            return Err(invalid(
                "rag.embedding_provider",
                format!(
                    "Unknown embedding provider '{}', expected ollama or hash",
                    rag.embedding_provider
                ),
            ));
        }
        if rag.chunk_size == 0 {
            return Err(invalid("rag.chunk_size", "Must be greater than 0"));
        }
        if rag.chunk_overlap >= rag.chunk_size {
            return Err(invalid(
                "rag.chunk_overlap",
                format!(
                    "Must be smaller than rag.chunk_size ({}), got {}",
                    rag.chunk_size, rag.chunk_overlap
                ),
            ));
        }
        if rag.vector_dim == 0 {
            return Err(invalid("rag.vector_dim", "Must be greater than 0"));
        }
        if !(-1.0..=1.0).contains(&rag.min_score) {
            return Err(invalid(
                "rag.min_score",
                format!("Must be between -1.0 and 1.0, got {}", rag.min_score),
            ));
        }
        Ok(())
    }

    fn validate_llm(&self) -> Result<(), ConfigError> {
        let llm = &self.llm;

        if !matches!(llm.provider.to_lowercase().as_str(), "gemini" | "openai") {
            return Err(invalid(
                "llm.provider",
                format!("Unknown provider '{}', expected gemini or openai", llm.provider),
            ));
        }
        if !(0.0..=2.0).contains(&llm.temperature) {
            return Err(invalid(
                "llm.temperature",
                format!("Must be between 0.0 and 2.0, got {}", llm.temperature),
            ));
        }
        if llm.max_tokens == 0 {
            return Err(invalid("llm.max_tokens", "Must be greater than 0"));
        }
        if !matches!(
            self.translation.provider.to_lowercase().as_str(),
            "google" | "indictrans" | "disabled"
        ) {
            return Err(invalid(
                "translation.provider",
                format!(
                    "Unknown provider '{}', expected google, indictrans or disabled",
                    self.translation.provider
                ),
            ));
        }
        Ok(())
    }

    /// Missing credentials are fatal in strict environments only
    fn validate_credentials(&self) -> Result<(), ConfigError> {
        let missing: Vec<&str> = [
            ("llm.api_key", self.llm.api_key.is_none()),
            ("stt.api_key", self.stt.api_key.is_none()),
        ]
        .into_iter()
        .filter(|(_, absent)| *absent)
        .map(|(field, _)| field)
        .collect();

        for field in &missing {
            if self.environment.is_strict() {
                return Err(ConfigError::MissingField(field.to_string()));
            }
            tracing::warn!(field = %field, "Credential not configured");
        }
        Ok(())
    }
}

/// Load settings from files and environment
///
/// Priority: env vars > config/{env}.yaml > config/default.yaml > defaults
pub fn load_settings(env: Option<&str>) -> Result<Settings, ConfigError> {
    let mut builder = Config::builder();

    // Load default config
    builder = builder.add_source(File::with_name("config/default").required(false));

    // Load environment-specific config
    if let Some(env_name) = env {
        builder =
            builder.add_source(File::with_name(&format!("config/{}", env_name)).required(false));
    }

    // Load from environment variables
    builder = builder.add_source(
        Environment::with_prefix("AGROSAATHI")
            .separator("__")
            .list_separator(",")
            .with_list_parse_key("server.cors_origins")
            .try_parsing(true),
    );

    let config = builder.build()?;
    let settings: Settings = config.try_deserialize()?;

    // Validate
    settings.validate()?;

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_settings() -> Settings {
        let mut settings = Settings::default();
        settings.llm.api_key = Some("test-key".to_string());
        settings.stt.api_key = Some("test-key".to_string());
        settings
    }

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.server.port, 5000);
        assert_eq!(settings.pipeline.retrieval_top_k, 3);
        assert_eq!(settings.rag.chunk_size, 1000);
        assert_eq!(settings.rag.chunk_overlap, 200);
        assert_eq!(settings.llm.model, "gemini-2.0-flash");
        assert_eq!(settings.stt.model, "whisper-large-v3");
        assert_eq!(settings.integrations.news_page_size, 12);
    }

    #[test]
    fn test_default_settings_validate() {
        assert!(valid_settings().validate().is_ok());
    }

    #[test]
    fn test_pipeline_validation() {
        let mut settings = valid_settings();
        settings.pipeline.retrieval_top_k = 0;
        assert!(settings.validate_pipeline().is_err());

        settings.pipeline.retrieval_top_k = 3;
        settings.pipeline.generation_timeout_secs = settings.server.timeout_seconds;
        assert!(settings.validate_pipeline().is_err());

        settings.pipeline.generation_timeout_secs = 30;
        assert!(settings.validate_pipeline().is_ok());
    }

    #[test]
    fn test_server_timeout_covers_chat_budget() {
        let mut settings = valid_settings();
        assert!(settings.chat_budget_secs() < settings.server.timeout_seconds);
        assert!(settings.validate().is_ok());

        settings.server.timeout_seconds = 180;
        assert!(matches!(
            settings.validate_pipeline(),
            Err(ConfigError::InvalidValue { ref field, .. }) if field == "server.timeout_seconds"
        ));

        settings.vision.enabled = false;
        settings.tts.timeout_secs = 10;
        let budget = settings.chat_budget_secs();
        assert_eq!(budget, 30 + 60 + 2 * 15 + 90 + 10);
        settings.server.timeout_seconds = budget + 1;
        assert!(settings.validate_pipeline().is_ok());
    }

    #[test]
    fn test_rag_validation_overlap() {
        let mut settings = valid_settings();
        settings.rag.chunk_overlap = 1000;
        assert!(settings.validate_rag().is_err());

        settings.rag.chunk_overlap = 999;
        assert!(settings.validate_rag().is_ok());

        settings.rag.store = "faiss".to_string();
        assert!(settings.validate_rag().is_err());

        settings.rag.store = "memory".to_string();
        settings.rag.embedding_provider = "word2vec".to_string();
        assert!(settings.validate_rag().is_err());
    }

    #[test]
    fn test_rag_kinds_parse_case_insensitively() {
        let settings = RagSettings {
            store: "Memory".to_string(),
            embedding_provider: " HASH ".to_string(),
            ..RagSettings::default()
        };
        assert_eq!(settings.store_kind(), Some(PassageStoreKind::Memory));
        assert_eq!(settings.embedding_provider_kind(), Some(EmbeddingProviderKind::Hash));
        assert_eq!(PassageStoreKind::parse("faiss"), None);
        assert_eq!(
            RagSettings::default().embedding_provider_kind(),
            Some(EmbeddingProviderKind::Ollama)
        );
    }

    #[test]
    fn test_llm_validation() {
        let mut settings = valid_settings();
        settings.llm.temperature = 2.5;
        assert!(settings.validate_llm().is_err());

        settings.llm.temperature = 0.2;
        settings.llm.provider = "claude".to_string();
        assert!(settings.validate_llm().is_err());

        settings.llm.provider = "OpenAI".to_string();
        assert!(settings.validate_llm().is_ok());

        settings.translation.provider = "bing".to_string();
        assert!(settings.validate_llm().is_err());
    }

    #[test]
    fn test_staging_dirs_must_differ() {
        let mut settings = valid_settings();
        settings.staging.output_dir = settings.staging.upload_dir.clone();
        let err = settings.validate().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref field, .. } if field == "staging.output_dir"));
    }

    #[test]
    fn test_missing_credentials_strict_only() {
        let mut settings = valid_settings();
        settings.llm.api_key = None;
        assert!(settings.validate_credentials().is_ok());

        settings.environment = RuntimeEnvironment::Production;
        assert!(matches!(
            settings.validate_credentials(),
            Err(ConfigError::MissingField(_))
        ));
    }

    #[test]
    fn test_yaml_sections_deserialize() {
        let yaml = r#"
environment: staging
server:
  port: 8080
  cors_origins: ["http://localhost:3000"]
pipeline:
  retrieval_top_k: 5
translation:
  provider: indictrans
  endpoint: "http://127.0.0.1:9000"
"#;
        let settings: Settings = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(settings.environment, RuntimeEnvironment::Staging);
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.server.max_upload_bytes, limits::MAX_UPLOAD_BYTES);
        assert_eq!(settings.pipeline.retrieval_top_k, 5);
        assert_eq!(settings.translation.provider, "indictrans");
        assert_eq!(settings.rag.qdrant_collection, "agrosaathi_knowledge");
    }
}
