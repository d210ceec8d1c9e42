//! Application State
//!
//! Shared state across all handlers.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use agrosaathi_config::Settings;
use agrosaathi_pipeline::{ChatOrchestrator, MediaStaging};

use crate::error::ApiError;

/// Application state
#[derive(Clone)]
pub struct AppState {
    /// Settings the server was started with
    pub config: Arc<Settings>,
    /// Chat pipeline with its injected gateways
    pub orchestrator: Arc<ChatOrchestrator>,
    /// Client for the weather/news proxies
    pub http: reqwest::Client,
    /// Bounds concurrent chat requests
    chat_permits: Arc<Semaphore>,
}

impl AppState {
    pub fn new(config: Settings, orchestrator: ChatOrchestrator) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.integrations.timeout_secs))
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Failed to build proxy HTTP client, using defaults");
                reqwest::Client::new()
            });
        let permits = config.server.max_concurrent_requests.max(1);

        Self {
            config: Arc::new(config),
            orchestrator: Arc::new(orchestrator),
            http,
            chat_permits: Arc::new(Semaphore::new(permits)),
        }
    }

    pub fn staging(&self) -> &MediaStaging {
        self.orchestrator.staging()
    }

    /// Wait for a chat slot, up to the configured queue timeout
    pub async fn acquire_chat_permit(&self) -> Result<OwnedSemaphorePermit, ApiError> {
        let wait = Duration::from_secs(self.config.server.queue_timeout_seconds);
        match tokio::time::timeout(wait, self.chat_permits.clone().acquire_owned()).await {
            Ok(Ok(permit)) => Ok(permit),
            Ok(Err(_)) => Err(ApiError::internal()),
            Err(_) => {
                tracing::warn!(
                    waited_secs = wait.as_secs(),
                    "No chat slot available, rejecting request"
                );
                Err(ApiError::service_unavailable(
                    "server_busy",
                    "Server is busy, please try again shortly",
                ))
            },
        }
    }

    /// Chat slots currently free
    pub fn available_chat_permits(&self) -> usize {
        self.chat_permits.available_permits()
    }
}
