//! Speech processing traits

use crate::{Language, Result};
use async_trait::async_trait;
use std::path::Path;

/// Speech-to-Text interface
///
/// Implementations:
/// - `WhisperHttpStt` - OpenAI/Groq-compatible Whisper transcription API
///
/// # Example
///
/// ```ignore
/// let stt: Arc<dyn SpeechToText> = Arc::new(WhisperHttpStt::new(config)?);
/// let text = stt.transcribe(staged.path(), Language::Hindi).await?;
/// println!("Transcribed: {}", text);
/// ```
#[async_trait]
pub trait SpeechToText: Send + Sync + 'static {
    /// Transcribe a staged audio file
    ///
    /// # Arguments
    /// * `audio` - Path of the staged audio payload
    /// * `language` - Spoken language hint
    ///
    /// # Returns
    /// Recognized text, trimmed. Failures are reported as `Error::Transcription`.
    async fn transcribe(&self, audio: &Path, language: Language) -> Result<String>;

    /// Get model name for logging
    fn model_name(&self) -> &str;
}

/// Synthesized speech returned by a [`TextToSpeech`] backend
#[derive(Debug, Clone)]
pub struct SynthesizedAudio {
    /// Encoded audio
    pub bytes: Vec<u8>,
    /// File extension matching the encoding (e.g. `mp3`)
    pub extension: String,
}

/// Text-to-Speech interface
///
/// Implementations:
/// - `HttpSpeechSynthesizer` - Neural voice synthesis sidecar
///
/// # Example
///
/// ```ignore
/// let tts: Arc<dyn TextToSpeech> = Arc::new(HttpSpeechSynthesizer::new(config)?);
/// let audio = tts.synthesize("नमस्ते", Language::Hindi).await?;
/// ```
#[async_trait]
pub trait TextToSpeech: Send + Sync + 'static {
    /// Synthesize text in the given language
    ///
    /// Failures are reported as `Error::Synthesis`.
    async fn synthesize(&self, text: &str, language: Language) -> Result<SynthesizedAudio>;

    /// Get model name for logging
    fn model_name(&self) -> &str;
}
