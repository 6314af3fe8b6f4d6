/*
[INPUT]:  Error sources (HTTP, serialization, URL, WebSocket, session state)
[OUTPUT]: Structured error type shared by the feed client and wallet directory
[POS]:    Error handling layer - unified error types for entire crate
[UPDATE]: When adding new error sources or improving error messages
*/

use reqwest::StatusCode;
use thiserror::Error;

/// Main error type for the dashboard feed client
#[derive(Error, Debug)]
pub enum FeedError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization/deserialization failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// URL parsing failed
    #[error("Invalid URL: {0}")]
    UrlParse(#[from] url::ParseError),

    /// WebSocket transport error
    #[error("WebSocket error: {0}")]
    WebSocket(String),

    /// Endpoint path was empty or could not be turned into a ws:// URL
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// Command issued while the session is not open
    #[error("Session is not open (status: {status})")]
    NotOpen { status: String },

    /// Outbound queue is full
    #[error("Outbound queue full, frame dropped")]
    SendQueueFull,

    /// Server answered with something we could not use
    #[error("Invalid response (status {status}): {message}")]
    InvalidResponse { status: u16, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl FeedError {
    /// Check if the error is worth retrying with a fresh connection
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            FeedError::Http(_)
                | FeedError::WebSocket(_)
                | FeedError::SendQueueFull
                | FeedError::InvalidResponse { .. }
        )
    }

    /// Create an invalid response error from status code and message
    pub fn invalid_response(status: StatusCode, message: impl Into<String>) -> Self {
        FeedError::InvalidResponse {
            status: status.as_u16(),
            message: message.into(),
        }
    }
}

/// Result type alias for feed operations
pub type Result<T> = std::result::Result<T, FeedError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_retryable() {
        assert!(FeedError::WebSocket("reset".to_string()).is_retryable());
        assert!(FeedError::SendQueueFull.is_retryable());

        let not_open = FeedError::NotOpen {
            status: "connecting".to_string(),
        };
        assert!(!not_open.is_retryable());
        assert!(!FeedError::InvalidEndpoint(String::new()).is_retryable());
    }

    #[test]
    fn test_invalid_response_creation() {
        let err = FeedError::invalid_response(StatusCode::BAD_GATEWAY, "upstream down");
        match err {
            FeedError::InvalidResponse { status, message } => {
                assert_eq!(status, 502);
                assert_eq!(message, "upstream down");
            }
            _ => panic!("Expected InvalidResponse variant"),
        }
    }

    #[test]
    fn test_not_open_message_mentions_status() {
        let err = FeedError::NotOpen {
            status: "closed".to_string(),
        };
        assert_eq!(err.to_string(), "Session is not open (status: closed)");
    }
}
