//! Chat Request Orchestrator
//!
//! Drives one request through a fixed sequence of gateways:
//!
//! ```text
//! audio ─► STT ─┐
//! text ─────────┴► translate → English ─► retrieve ─► generate ─► translate back ─► TTS
//! image ─► classify ─────────────────────────┘ (label joins the query, image joins the prompt)
//! ```
//!
//! Only a missing utterance, a failed transcription with no text fallback
//! and a failed generation end the request. Every other stage degrades:
//! translation passes text through, retrieval yields an empty context,
//! classification yields a descriptive sentence, synthesis yields no audio.

use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};

use agrosaathi_config::{
    constants::{limits, rag, timeouts},
    PipelineSettings,
};
use agrosaathi_core::{
    conversation::recent_turns, Classification, ClassificationOutcome, GenerationRequest,
    ImageClassifier, Language, ResponseGenerator, RetrievedContext, Retriever, SpeechToText,
    TextToSpeech, Translator, Turn,
};

use crate::staging::{extension_of, MediaStaging, StagedFile};
use crate::PipelineError;

/// Route prefix under which published audio is served
pub const AUDIO_ROUTE: &str = "/api/audio";

/// Uploaded binary with its client-side filename
#[derive(Debug, Clone, Default)]
pub struct MediaPayload {
    pub bytes: Vec<u8>,
    pub filename: String,
}

impl MediaPayload {
    pub fn new(bytes: Vec<u8>, filename: impl Into<String>) -> Self {
        Self {
            bytes,
            filename: filename.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Sanitized extension used when staging
    pub fn extension(&self) -> String {
        extension_of(&self.filename)
    }
}

/// One chat request as received from the client
#[derive(Debug, Clone)]
pub struct IncomingRequest {
    pub language: Language,
    pub text: Option<String>,
    pub audio: Option<MediaPayload>,
    pub image: Option<MediaPayload>,
    /// Prior turns in English, oldest first
    pub history: Vec<Turn>,
}

impl IncomingRequest {
    pub fn new(language: Language) -> Self {
        Self {
            language,
            text: None,
            audio: None,
            image: None,
            history: Vec::new(),
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_audio(mut self, audio: MediaPayload) -> Self {
        self.audio = Some(audio);
        self
    }

    pub fn with_image(mut self, image: MediaPayload) -> Self {
        self.image = Some(image);
        self
    }

    pub fn with_history(mut self, history: Vec<Turn>) -> Self {
        self.history = history;
        self
    }
}

/// Orchestrator configuration
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Passages requested from the retriever
    pub retrieval_top_k: usize,
    /// Upper bound on the generation stage
    pub generation_timeout: Duration,
    /// Prior turns forwarded to generation
    pub max_history_turns: usize,
    /// Prefix of published audio URLs
    pub audio_route: String,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            retrieval_top_k: rag::TOP_K,
            generation_timeout: Duration::from_secs(timeouts::GENERATION_STAGE_SECS),
            max_history_turns: limits::MAX_HISTORY_TURNS,
            audio_route: AUDIO_ROUTE.to_string(),
        }
    }
}

impl From<&PipelineSettings> for OrchestratorConfig {
    fn from(settings: &PipelineSettings) -> Self {
        Self {
            retrieval_top_k: settings.retrieval_top_k,
            generation_timeout: Duration::from_secs(settings.generation_timeout_secs),
            max_history_turns: settings.max_history_turns,
            audio_route: AUDIO_ROUTE.to_string(),
        }
    }
}

/// Wall-clock time per stage, in milliseconds; `None` when the stage was skipped
#[derive(Debug, Clone, Default, Serialize)]
pub struct StageTimings {
    pub transcription_ms: Option<u64>,
    pub classification_ms: Option<u64>,
    pub translation_in_ms: Option<u64>,
    pub retrieval_ms: Option<u64>,
    pub generation_ms: Option<u64>,
    pub translation_out_ms: Option<u64>,
    pub synthesis_ms: Option<u64>,
    pub total_ms: u64,
}

/// Final answer returned to the client
#[derive(Debug, Clone, Serialize)]
pub struct PipelineResult {
    /// Utterance in the user's language (transcript or typed text)
    pub user_query_transcribed: String,
    pub user_query_english: String,
    /// Detected disease label, if the classifier produced one
    pub disease_detected: Option<String>,
    pub classification: Option<Classification>,
    /// Whether any knowledge-base passage was used
    pub context_retrieved: bool,
    /// Answer in the user's language
    pub response_text: String,
    pub english_response_text: String,
    /// URL of the spoken answer, `None` when synthesis failed
    pub audio_url: Option<String>,
    pub language: String,
    pub timings: StageTimings,
    /// Stages that fell back to a default value
    #[serde(skip)]
    pub degraded_stages: Vec<&'static str>,
}

fn elapsed_ms(start: Instant) -> u64 {
    start.elapsed().as_millis() as u64
}

/// Per-request scratch state
struct RequestTrace {
    start: Instant,
    timings: StageTimings,
    degraded: Vec<&'static str>,
}

impl RequestTrace {
    fn new() -> Self {
        Self {
            start: Instant::now(),
            timings: StageTimings::default(),
            degraded: Vec::new(),
        }
    }

    fn degrade(&mut self, stage: &'static str, error: &dyn std::fmt::Display) {
        tracing::warn!(stage, error = %error, "Stage failed, continuing with fallback");
        self.degraded.push(stage);
    }
}

/// Chat pipeline
///
/// Gateways are injected at construction; retriever and classifier are
/// optional and attached with the builder methods.
pub struct ChatOrchestrator {
    stt: Arc<dyn SpeechToText>,
    translator: Arc<dyn Translator>,
    generator: Arc<dyn ResponseGenerator>,
    tts: Arc<dyn TextToSpeech>,
    classifier: Option<Arc<dyn ImageClassifier>>,
    retriever: Option<Arc<dyn Retriever>>,
    staging: MediaStaging,
    config: OrchestratorConfig,
}

impl ChatOrchestrator {
    pub fn new(
        stt: Arc<dyn SpeechToText>,
        translator: Arc<dyn Translator>,
        generator: Arc<dyn ResponseGenerator>,
        tts: Arc<dyn TextToSpeech>,
        staging: MediaStaging,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            stt,
            translator,
            generator,
            tts,
            classifier: None,
            retriever: None,
            staging,
            config,
        }
    }

    pub fn with_classifier(mut self, classifier: Arc<dyn ImageClassifier>) -> Self {
        self.classifier = Some(classifier);
        self
    }

    pub fn with_retriever(mut self, retriever: Arc<dyn Retriever>) -> Self {
        self.retriever = Some(retriever);
        self
    }

    pub fn staging(&self) -> &MediaStaging {
        &self.staging
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    pub fn has_classifier(&self) -> bool {
        self.classifier.is_some()
    }

    pub fn has_retriever(&self) -> bool {
        self.retriever.is_some()
    }

    /// Run one request end to end
    pub async fn handle(&self, request: IncomingRequest) -> Result<PipelineResult, PipelineError> {
        let IncomingRequest {
            language,
            text,
            audio,
            image,
            history,
        } = request;

        let text = text
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());
        let audio = audio.filter(|a| !a.is_empty());
        let image = image.filter(|i| !i.is_empty());

        let mut trace = RequestTrace::new();

        let user_text = match (audio, text) {
            (Some(audio), fallback) => {
                self.transcribe(&audio, language, fallback, &mut trace)
                    .await?
            },
            (None, Some(text)) => text,
            (None, None) => return Err(PipelineError::MissingInput),
        };

        // Held until generation is done; dropped on every exit path
        let (mut image_file, classification) = self.classify(image, &mut trace).await;

        let t0 = Instant::now();
        let english_query = self
            .translate_or_passthrough(&user_text, language, Language::English, "translation_in", &mut trace)
            .await;
        if !language.is_english() {
            trace.timings.translation_in_ms = Some(elapsed_ms(t0));
        }

        let context = self
            .retrieve(&english_query, &classification, &mut trace)
            .await;

        let generation = GenerationRequest::new(english_query.clone())
            .with_context(context.render())
            .with_auxiliary_info(classification.describe())
            .with_image(image_file.as_ref().map(|f| f.path().to_path_buf()))
            .with_history(recent_turns(&history, self.config.max_history_turns));

        let english_answer = self.generate(generation, &mut trace).await;

        if let Some(file) = image_file.as_mut() {
            if let Err(e) = file.release() {
                tracing::warn!(error = %e, "Failed to release staged image");
            }
        }
        let english_answer = english_answer?;

        let t0 = Instant::now();
        let response_text = self
            .translate_or_passthrough(&english_answer, Language::English, language, "translation_out", &mut trace)
            .await;
        if !language.is_english() {
            trace.timings.translation_out_ms = Some(elapsed_ms(t0));
        }

        let audio_url = self.synthesize(&response_text, language, &mut trace).await;

        trace.timings.total_ms = elapsed_ms(trace.start);
        tracing::info!(
            language = language.code(),
            total_ms = trace.timings.total_ms,
            degraded = ?trace.degraded,
            context_retrieved = !context.is_empty(),
            "Chat request complete"
        );

        Ok(PipelineResult {
            user_query_transcribed: user_text,
            user_query_english: english_query,
            disease_detected: classification.label().map(str::to_string),
            classification: classification.detection().cloned(),
            context_retrieved: !context.is_empty(),
            response_text,
            english_response_text: english_answer,
            audio_url,
            language: language.code().to_string(),
            timings: trace.timings,
            degraded_stages: trace.degraded,
        })
    }

    /// Stage and transcribe audio, falling back to typed text when present
    async fn transcribe(
        &self,
        audio: &MediaPayload,
        language: Language,
        fallback: Option<String>,
        trace: &mut RequestTrace,
    ) -> Result<String, PipelineError> {
        let failure = match self.staging.stage(&audio.bytes, &audio.extension()).await {
            Ok(mut staged) => {
                let t0 = Instant::now();
                let outcome = self.stt.transcribe(staged.path(), language).await;
                trace.timings.transcription_ms = Some(elapsed_ms(t0));

                if let Err(e) = staged.release() {
                    tracing::warn!(error = %e, "Failed to release staged audio");
                }

                match outcome {
                    Ok(text) if !text.trim().is_empty() => return Ok(text.trim().to_string()),
                    Ok(_) => "Empty transcription".to_string(),
                    Err(e) => e.to_string(),
                }
            },
            Err(e) => format!("Audio could not be staged: {}", e),
        };

        match fallback {
            Some(text) => {
                trace.degrade("transcription", &failure);
                Ok(text)
            },
            None => {
                tracing::warn!(error = %failure, "Transcription failed and no text was provided");
                Err(PipelineError::Transcription(failure))
            },
        }
    }

    /// Stage and classify an image
    ///
    /// Returns the staged file so it can be forwarded to generation.
    async fn classify(
        &self,
        image: Option<MediaPayload>,
        trace: &mut RequestTrace,
    ) -> (Option<StagedFile>, ClassificationOutcome) {
        let Some(image) = image else {
            return (None, ClassificationOutcome::NoImage);
        };

        let staged = match self.staging.stage(&image.bytes, &image.extension()).await {
            Ok(staged) => staged,
            Err(e) => {
                trace.degrade("classification", &e);
                return (
                    None,
                    ClassificationOutcome::Failed {
                        reason: "the image could not be stored".to_string(),
                    },
                );
            },
        };

        let Some(classifier) = &self.classifier else {
            return (Some(staged), ClassificationOutcome::Unavailable);
        };

        let t0 = Instant::now();
        let outcome = match classifier.classify(staged.path()).await {
            Ok(result) => ClassificationOutcome::Detected(result),
            Err(e) => {
                trace.degrade("classification", &e);
                ClassificationOutcome::Failed {
                    reason: e.to_string(),
                }
            },
        };
        trace.timings.classification_ms = Some(elapsed_ms(t0));

        (Some(staged), outcome)
    }

    /// Translate, or return the input unchanged on identity pairs and failures
    async fn translate_or_passthrough(
        &self,
        text: &str,
        from: Language,
        to: Language,
        stage: &'static str,
        trace: &mut RequestTrace,
    ) -> String {
        if from == to {
            return text.to_string();
        }

        match self.translator.translate(text, from, to).await {
            Ok(translated) if !translated.trim().is_empty() => translated.trim().to_string(),
            Ok(_) => {
                trace.degrade(stage, &"empty translation");
                text.to_string()
            },
            Err(e) => {
                trace.degrade(stage, &e);
                text.to_string()
            },
        }
    }

    async fn retrieve(
        &self,
        english_query: &str,
        classification: &ClassificationOutcome,
        trace: &mut RequestTrace,
    ) -> RetrievedContext {
        let Some(retriever) = &self.retriever else {
            return RetrievedContext::empty();
        };

        let query = format!("{} {}", english_query, classification.label().unwrap_or(""));

        let t0 = Instant::now();
        let context = match retriever.retrieve(&query, self.config.retrieval_top_k).await {
            Ok(passages) => RetrievedContext::from_passages(passages),
            Err(e) => {
                trace.degrade("retrieval", &e);
                RetrievedContext::empty()
            },
        };
        trace.timings.retrieval_ms = Some(elapsed_ms(t0));
        context
    }

    async fn generate(
        &self,
        request: GenerationRequest,
        trace: &mut RequestTrace,
    ) -> Result<String, PipelineError> {
        let t0 = Instant::now();
        let outcome =
            tokio::time::timeout(self.config.generation_timeout, self.generator.generate(request))
                .await;
        trace.timings.generation_ms = Some(elapsed_ms(t0));

        let failure = match outcome {
            Ok(Ok(answer)) if !answer.trim().is_empty() => return Ok(answer.trim().to_string()),
            Ok(Ok(_)) => "Empty answer".to_string(),
            Ok(Err(e)) => e.to_string(),
            Err(_) => format!(
                "Timed out after {}s",
                self.config.generation_timeout.as_secs()
            ),
        };

        tracing::error!(
            model = self.generator.model_name(),
            error = %failure,
            "Generation failed"
        );
        Err(PipelineError::Generation(failure))
    }

    /// Synthesize and publish the answer, returning its URL
    async fn synthesize(
        &self,
        text: &str,
        language: Language,
        trace: &mut RequestTrace,
    ) -> Option<String> {
        let t0 = Instant::now();
        let outcome = match self.tts.synthesize(text, language).await {
            Ok(audio) => self
                .staging
                .publish(&audio.bytes, &audio.extension)
                .await
                .map_err(agrosaathi_core::Error::from),
            Err(e) => Err(e),
        };
        trace.timings.synthesis_ms = Some(elapsed_ms(t0));

        match outcome {
            Ok(published) => Some(format!(
                "{}/{}",
                self.config.audio_route.trim_end_matches('/'),
                published.filename
            )),
            Err(e) => {
                trace.degrade("synthesis", &e);
                None
            },
        }
    }
}
