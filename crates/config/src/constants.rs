//! Centralized constants for the AgroSaathi backend
//!
//! Single source of truth for default endpoints, model names and limits.
//! Settings defaults and crate-level configs both read from here.

/// External service endpoints
pub mod endpoints {
    /// Groq OpenAI-compatible API (Whisper transcription)
    pub const GROQ_DEFAULT: &str = "https://api.groq.com/openai/v1";

    /// Gemini REST API
    pub const GEMINI_DEFAULT: &str = "https://generativelanguage.googleapis.com/v1beta";

    /// OpenAI API endpoint
    pub const OPENAI_DEFAULT: &str = "https://api.openai.com/v1";

    /// Public Google translation endpoint
    pub const GOOGLE_TRANSLATE_DEFAULT: &str = "https://translate.googleapis.com";

    /// IndicTrans2 translation sidecar
    pub const INDICTRANS_DEFAULT: &str = "http://127.0.0.1:8091";

    /// Speech synthesis sidecar
    pub const TTS_DEFAULT: &str = "http://127.0.0.1:8092";

    /// Plant-disease classifier sidecar
    pub const VISION_DEFAULT: &str = "http://127.0.0.1:8093";

    /// Ollama embeddings endpoint
    pub const OLLAMA_DEFAULT: &str = "http://localhost:11434";

    /// Qdrant vector store endpoint (REST API port)
    pub const QDRANT_DEFAULT: &str = "http://127.0.0.1:6333";

    /// OpenWeatherMap API
    pub const OPENWEATHER_DEFAULT: &str = "https://api.openweathermap.org/data/2.5";

    /// NewsAPI
    pub const NEWSAPI_DEFAULT: &str = "https://newsapi.org/v2";
}

/// Model identifiers
pub mod models {
    pub const WHISPER: &str = "whisper-large-v3";
    pub const GEMINI: &str = "gemini-2.0-flash";
    pub const EMBEDDING: &str = "all-minilm";
    pub const EMBEDDING_DIM: usize = 384;
}

/// Timeouts (in seconds)
pub mod timeouts {
    /// Transcription request timeout
    pub const STT_SECS: u64 = 60;

    /// Translation request timeout
    pub const TRANSLATION_SECS: u64 = 15;

    /// Classifier request timeout
    pub const VISION_SECS: u64 = 30;

    /// LLM request timeout
    pub const LLM_REQUEST_SECS: u64 = 60;

    /// Whole generation stage, retries included
    pub const GENERATION_STAGE_SECS: u64 = 90;

    /// TTS synthesis timeout
    pub const TTS_SECS: u64 = 30;

    /// Weather/news proxy timeout
    pub const INTEGRATION_SECS: u64 = 10;

    /// Whole HTTP request timeout, above the worst-case chat budget
    pub const REQUEST_SECS: u64 = 300;
}

/// RAG (Retrieval-Augmented Generation) defaults
pub mod rag {
    /// Passages handed to the LLM
    pub const TOP_K: usize = 3;

    /// Chunk size in characters
    pub const CHUNK_SIZE: usize = 1000;

    /// Overlap between consecutive chunks in characters
    pub const CHUNK_OVERLAP: usize = 200;

    /// Minimum similarity score to keep a passage
    pub const MIN_SCORE: f32 = 0.0;

    /// Qdrant collection name
    pub const COLLECTION: &str = "agrosaathi_knowledge";
}

/// Request limits
pub mod limits {
    /// Largest accepted multipart body (audio + image)
    pub const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

    /// Chat requests processed concurrently
    pub const MAX_CONCURRENT_CHATS: usize = 32;

    /// Prior turns forwarded to the LLM
    pub const MAX_HISTORY_TURNS: usize = 10;
}

/// Weather/news proxy defaults
pub mod integrations {
    pub const NEWS_QUERY: &str = "agricultural schemes";
    pub const NEWS_PAGE_SIZE: u32 = 12;
}
