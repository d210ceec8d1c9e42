//! Text-to-Speech gateways

mod http_backend;

pub use http_backend::{HttpSpeechSynthesizer, SynthesizerConfig};
