//! Router tests with mock gateways

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tower::ServiceExt;

use agrosaathi_config::Settings;
use agrosaathi_core::{
    Error, GenerationRequest, Language, ResponseGenerator, Result, SpeechToText,
    SynthesizedAudio, TextToSpeech, Translator,
};
use agrosaathi_pipeline::{ChatOrchestrator, MediaStaging, OrchestratorConfig};
use agrosaathi_server::{create_router, AppState};

struct EchoStt;

#[async_trait]
impl SpeechToText for EchoStt {
    async fn transcribe(&self, _audio: &Path, _language: Language) -> Result<String> {
        Ok("पत्ते पीले हैं".to_string())
    }

    fn model_name(&self) -> &str {
        "echo"
    }
}

struct TagTranslator;

#[async_trait]
impl Translator for TagTranslator {
    async fn translate(&self, text: &str, _from: Language, to: Language) -> Result<String> {
        Ok(format!("({}) {}", to.code(), text))
    }

    fn name(&self) -> &str {
        "tag"
    }
}

struct FixedGenerator {
    fail: bool,
}

#[async_trait]
impl ResponseGenerator for FixedGenerator {
    async fn generate(&self, _request: GenerationRequest) -> Result<String> {
        if self.fail {
            return Err(Error::Generation("upstream 500: secret-token-xyz".into()));
        }
        Ok("Use neem oil spray.".to_string())
    }

    fn model_name(&self) -> &str {
        "fixed"
    }
}

#[derive(Default)]
struct CountingTts {
    calls: AtomicUsize,
    delay: Option<Duration>,
}

#[async_trait]
impl TextToSpeech for CountingTts {
    async fn synthesize(&self, _text: &str, _language: Language) -> Result<SynthesizedAudio> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        Ok(SynthesizedAudio {
            bytes: b"ID3audio".to_vec(),
            extension: "mp3".to_string(),
        })
    }

    fn model_name(&self) -> &str {
        "counting"
    }
}

struct TestApp {
    _dir: TempDir,
    router: Router,
    tts: Arc<CountingTts>,
}

async fn test_app(fail_generation: bool) -> TestApp {
    build_app(fail_generation, CountingTts::default(), |_| {}).await
}

async fn build_app(
    fail_generation: bool,
    tts: CountingTts,
    configure: impl FnOnce(&mut Settings),
) -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let staging = MediaStaging::new(dir.path().join("uploads"), dir.path().join("outputs"));
    staging.ensure_dirs().await.unwrap();

    let tts = Arc::new(tts);
    let orchestrator = ChatOrchestrator::new(
        Arc::new(EchoStt),
        Arc::new(TagTranslator),
        Arc::new(FixedGenerator {
            fail: fail_generation,
        }),
        tts.clone(),
        staging,
        OrchestratorConfig::default(),
    );

    let mut settings = Settings::default();
    settings.integrations.weather_api_key = None;
    settings.integrations.news_api_key = None;
    configure(&mut settings);

    TestApp {
        _dir: dir,
        router: create_router(AppState::new(settings, orchestrator)),
        tts,
    }
}

const BOUNDARY: &str = "agrosaathi-test-boundary";

enum Part<'a> {
    Text(&'a str, &'a str),
    File(&'a str, &'a str, &'a [u8]),
}

fn multipart_request(parts: &[Part<'_>]) -> Request<Body> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name)
                        .as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            },
            Part::File(name, filename, bytes) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n\
                         Content-Type: application/octet-stream\r\n\r\n",
                        name, filename
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(bytes);
            },
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .method("POST")
        .uri("/api/chat")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_root_status() {
    let app = test_app(false).await;
    let response = app.router.oneshot(get("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["status"], "AgroSaathi Backend is running");
}

#[tokio::test]
async fn test_chat_text_in_english() {
    let app = test_app(false).await;
    let request = multipart_request(&[
        Part::Text("language", "en"),
        Part::Text("text", "my tomato leaves are yellow"),
    ]);

    let response = app.router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    assert_eq!(json["user_query_transcribed"], "my tomato leaves are yellow");
    assert_eq!(json["user_query_english"], "my tomato leaves are yellow");
    assert_eq!(json["response_text"], "Use neem oil spray.");
    assert_eq!(json["english_response_text"], "Use neem oil spray.");
    assert_eq!(json["context_retrieved"], false);
    assert!(json["disease_detected"].is_null());
    assert!(json["audio_url"].as_str().unwrap().starts_with("/api/audio/tts_"));
}

#[tokio::test]
async fn test_chat_hindi_audio_then_fetch_audio() {
    let app = test_app(false).await;
    let request = multipart_request(&[
        Part::Text("language", "hi"),
        Part::File("audio", "recording.webm", b"\x1a\x45\xdf\xa3webm"),
        Part::Text(
            "conversation_history",
            r#"[{"role":"user","content":"hello"},{"role":"assistant","content":"Namaste"}]"#,
        ),
    ]);

    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    assert_eq!(json["user_query_transcribed"], "पत्ते पीले हैं");
    assert_eq!(json["user_query_english"], "(en) पत्ते पीले हैं");
    assert_eq!(json["response_text"], "(hi) Use neem oil spray.");
    assert_eq!(json["language"], "hi");

    let audio_url = json["audio_url"].as_str().unwrap().to_string();
    let response = app.router.oneshot(get(&audio_url)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "audio/mpeg");
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"ID3audio");
}

#[tokio::test]
async fn test_chat_without_input_is_bad_request() {
    let app = test_app(false).await;
    let request = multipart_request(&[Part::Text("language", "mr")]);

    let response = app.router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = json_body(response).await;
    assert_eq!(json["error"], "No audio or text input provided");
    assert_eq!(json["code"], "missing_input");
    assert!(json["request_id"].is_string());
    assert_eq!(app.tts.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_chat_bad_history_is_bad_request() {
    let app = test_app(false).await;
    let request = multipart_request(&[
        Part::Text("text", "hello"),
        Part::Text("conversation_history", "{not json"),
    ]);

    let response = app.router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_generation_failure_is_generic_server_error() {
    let app = test_app(true).await;
    let request = multipart_request(&[Part::Text("text", "when to irrigate wheat")]);

    let response = app.router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let json = json_body(response).await;
    let message = json["error"].as_str().unwrap();
    assert!(!message.contains("secret-token-xyz"));
    assert_eq!(json["code"], "generation");
    assert_eq!(app.tts.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_audio_not_found() {
    let app = test_app(false).await;

    let response = app
        .router
        .clone()
        .oneshot(get("/api/audio/tts_missing.mp3"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .router
        .oneshot(get("/api/audio/..%2Fuploads%2Fsecret.wav"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_integrations_without_keys() {
    let app = test_app(false).await;

    let response = app
        .router
        .clone()
        .oneshot(get("/api/weather?lat=18.52&lon=73.85"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json_body(response).await["error"], "Weather API key not configured");

    let response = app.router.oneshot(get("/api/news")).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json_body(response).await["error"], "Agri News API key not configured");
}

#[tokio::test]
async fn test_health_reports_components() {
    let app = test_app(false).await;
    let response = app.router.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    assert_eq!(json["checks"]["staging"]["status"], "ok");
    assert_eq!(json["checks"]["retrieval"]["status"], "disabled");
    assert_eq!(json["status"], "degraded");
}

#[tokio::test(start_paused = true)]
async fn test_server_timeout_returns_json_error() {
    let tts = CountingTts {
        delay: Some(Duration::from_secs(200)),
        ..Default::default()
    };
    let app = build_app(false, tts, |settings| settings.server.timeout_seconds = 5).await;
    let request = multipart_request(&[Part::Text("text", "when to irrigate wheat")]);

    let response = app.router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);

    let json = json_body(response).await;
    assert_eq!(json["code"], "timeout");
    assert!(json["error"].is_string());
    assert!(json["request_id"].is_string());
    assert_eq!(app.tts.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_default_timeout_outlasts_slow_synthesis() {
    let tts = CountingTts {
        delay: Some(Duration::from_secs(200)),
        ..Default::default()
    };
    let app = build_app(false, tts, |_| {}).await;
    let request = multipart_request(&[Part::Text("text", "when to irrigate wheat")]);

    let response = app.router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["response_text"], "Use neem oil spray.");
}
