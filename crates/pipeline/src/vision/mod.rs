//! Plant-disease classification gateways

mod http_backend;

pub use http_backend::{ClassifierConfig, HttpImageClassifier};
