//! Error types for the API client.

use thiserror::Error;

/// API client errors.
///
/// Non-2xx responses are not errors; they come back as [`ApiResponse`](crate::ApiResponse)
/// values.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The request never produced a response (DNS, refused connection, timeout).
    #[error("{method} request to {url} failed: {source}")]
    Transport {
        /// Request method.
        method: http::Method,
        /// Full request URL.
        url: String,
        /// Underlying client error.
        #[source]
        source: reqwest::Error,
    },

    /// Header name or value is invalid.
    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    /// JSON encoding or decoding failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The response body could not be read.
    #[error("Body read error: {0}")]
    BodyRead(String),
}

impl ClientError {
    /// Create an invalid header error.
    pub fn invalid_header(message: impl Into<String>) -> Self {
        Self::InvalidHeader(message.into())
    }

    /// Returns true if the error happened before any response was received.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }
}

/// Result type for API client operations.
pub type ClientResult<T> = Result<T, ClientError>;
