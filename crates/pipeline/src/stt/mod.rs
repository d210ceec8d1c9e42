//! Speech-to-Text gateways

mod http_backend;

pub use http_backend::{WhisperConfig, WhisperHttpStt};
