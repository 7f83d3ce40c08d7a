//! Error types for the neuroseg client

use thiserror::Error;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur when using the segmentation client
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed at the transport level
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// API returned an error status code
    #[error("API error (status {status}): {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Error message from the API
        message: String,
    },

    /// Failed to parse response
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// The task identifier is unknown to the server
    ///
    /// Unlike transport errors this is permanent: the identifier will
    /// never become valid by retrying, so polling must stop immediately.
    #[error("Task not found: {0}")]
    TaskNotFound(String),

    /// Invalid request
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl ClientError {
    /// Create an API error from status code and message
    pub fn api_error(status: u16, message: impl Into<String>) -> Self {
        Self::ApiError {
            status,
            message: message.into(),
        }
    }

    /// Check if this error means the task id is permanently invalid
    pub fn is_task_not_found(&self) -> bool {
        matches!(self, Self::TaskNotFound(_))
            || matches!(self, Self::ApiError { status: 404, .. })
    }

    /// Check if a status poll hitting this error should be retried
    ///
    /// Everything is recoverable by default; only a permanently invalid
    /// task id or a malformed request is worth giving up over.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::TaskNotFound(_) | Self::InvalidRequest(_))
            && !self.is_task_not_found()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_detection() {
        assert!(ClientError::TaskNotFound("gone".into()).is_task_not_found());
        assert!(ClientError::api_error(404, "no such task").is_task_not_found());
        assert!(!ClientError::api_error(500, "boom").is_task_not_found());
    }

    #[test]
    fn test_retryability() {
        assert!(ClientError::api_error(503, "busy").is_retryable());
        assert!(ClientError::ParseError("bad json".into()).is_retryable());
        assert!(!ClientError::TaskNotFound("gone".into()).is_retryable());
        assert!(!ClientError::api_error(404, "no such task").is_retryable());
        assert!(!ClientError::InvalidRequest("empty id".into()).is_retryable());
    }
}
