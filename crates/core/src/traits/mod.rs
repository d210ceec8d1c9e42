//! Gateway traits for the assistant
//!
//! Every external capability sits behind one of these traits so that:
//! - Backends can be swapped without touching the request pipeline
//! - Tests can substitute mocks and count calls
//! - Instances are injected at construction time instead of living in globals
//!
//! # Trait Hierarchy
//!
//! ```text
//! Speech Processing:
//!   - SpeechToText: Audio file → Text transcription
//!   - TextToSpeech: Text → Audio synthesis
//!
//! Text Processing:
//!   - Translator: Translate between English and Indian languages
//!
//! Vision:
//!   - ImageClassifier: Crop image → disease label + confidence
//!
//! Retrieval:
//!   - Retriever: Query → ranked knowledge-base passages
//!
//! Generation:
//!   - ResponseGenerator: Context + query (+ image, history) → answer
//! ```

mod generation;
mod retriever;
mod speech;
mod text_processing;
mod vision;

pub use generation::{GenerationRequest, ResponseGenerator};
pub use retriever::Retriever;
pub use speech::{SpeechToText, SynthesizedAudio, TextToSpeech};
pub use text_processing::Translator;
pub use vision::ImageClassifier;
