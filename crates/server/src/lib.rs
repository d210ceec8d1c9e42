//! AgroSaathi Server
//!
//! HTTP surface for the agricultural assistant: multipart chat, generated
//! audio, weather/news proxies, health and Prometheus metrics.

pub mod bootstrap;
pub mod chat;
pub mod error;
pub mod http;
pub mod integrations;
pub mod metrics;
pub mod state;

pub use bootstrap::build_orchestrator;
pub use error::ApiError;
pub use http::create_router;
pub use metrics::{
    init_metrics, record_degraded_stage, record_error, record_request, record_stage_latency,
    record_total_latency,
};
pub use state::AppState;

use thiserror::Error;

/// Startup and wiring errors
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Configuration error: {0}")]
    Config(#[from] agrosaathi_config::ConfigError),

    #[error("Failed to initialize {component}: {message}")]
    Startup {
        component: &'static str,
        message: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ServerError {
    pub fn startup(component: &'static str, err: impl std::fmt::Display) -> Self {
        ServerError::Startup {
            component,
            message: err.to_string(),
        }
    }
}
