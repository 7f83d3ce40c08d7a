//! Neuroseg HTTP Client
//!
//! A type-safe HTTP client for the MRI segmentation backend, plus the
//! task poller that tracks long-running segmentation jobs.
//!
//! The backend exposes a small REST surface: start processing an uploaded
//! scan, poll task status, fetch the volumetric results of a finished
//! task, and fetch per-tissue preview images. [`SegmentationClient`]
//! covers those endpoints; [`TaskPoller`] owns the repeated status
//! queries and turns terminal states into one-shot observer events.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use neuroseg_client::{PollerConfig, SegmentationClient, TaskEvent, TaskObserver, TaskPoller};
//!
//! struct PrintObserver;
//!
//! impl TaskObserver for PrintObserver {
//!     fn on_event(&self, event: TaskEvent) {
//!         println!("{event:?}");
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Arc::new(SegmentationClient::new("http://localhost:5000"));
//!     let task_id = client.start_processing("scan-42").await?;
//!
//!     let poller = TaskPoller::new(client, PollerConfig::default());
//!     let session = poller.start(&task_id, Arc::new(PrintObserver))?;
//!     session.wait().await;
//!     Ok(())
//! }
//! ```

pub mod error;
mod observer;
mod poller;
mod previews;
mod tasks;

// Re-export commonly used types
pub use error::{ClientError, Result};
pub use observer::{ChannelPreviews, TaskEvent, TaskFailure, TaskObserver};
pub use poller::{PollSession, PollerConfig, TaskPoller};
pub use tasks::SegmentationApi;

use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;

/// Per-request timeout applied to every call.
///
/// The overall polling ceiling bounds total session time; this bounds a
/// single hung request, which the backend is known to produce.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(12);

/// HTTP client for the segmentation backend API
///
/// Endpoint methods are organized into logical groups:
/// - Task lifecycle (start processing, status, results) in `tasks`
/// - Segmentation previews in `previews`
#[derive(Debug, Clone)]
pub struct SegmentationClient {
    /// Base URL of the backend (e.g., "http://localhost:5000")
    base_url: String,
    /// HTTP client instance
    client: Client,
    /// Timeout applied to each individual request
    request_timeout: Duration,
}

impl SegmentationClient {
    /// Create a new client with the default per-request timeout.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: Client::new(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Create a client with a custom reqwest Client
    ///
    /// This allows configuring proxies, TLS settings, etc. The per-request
    /// timeout still applies on top of whatever the client is built with.
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Override the per-request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Base URL of the backend.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Issue a GET and deserialize the JSON response.
    pub(crate) async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self
            .client
            .get(url)
            .timeout(self.request_timeout)
            .send()
            .await?;
        self.handle_response(response).await
    }

    /// Issue a bodyless POST and deserialize the JSON response.
    pub(crate) async fn post_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self
            .client
            .post(url)
            .timeout(self.request_timeout)
            .send()
            .await?;
        self.handle_response(response).await
    }

    /// Handle an API response and deserialize JSON
    ///
    /// Checks the status code and returns an appropriate error if the
    /// request failed, or deserializes the body if successful. A 404 is
    /// mapped onto [`ClientError::TaskNotFound`] here, at the boundary,
    /// so the poller never inspects raw status codes.
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());

            if status == reqwest::StatusCode::NOT_FOUND {
                return Err(ClientError::TaskNotFound(error_text));
            }
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = SegmentationClient::new("http://localhost:5000");
        assert_eq!(client.base_url(), "http://localhost:5000");
    }

    #[test]
    fn test_client_trims_trailing_slash() {
        let client = SegmentationClient::new("http://localhost:5000/");
        assert_eq!(client.base_url(), "http://localhost:5000");
    }

    #[test]
    fn test_client_request_timeout_override() {
        let client = SegmentationClient::new("http://localhost:5000")
            .with_request_timeout(Duration::from_secs(5));
        assert_eq!(client.request_timeout, Duration::from_secs(5));
    }
}
