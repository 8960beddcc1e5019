//! HTTP transport port

use async_trait::async_trait;
use ringcentral_domain::{ApiRequest, ApiResponse};

/// Failures below the HTTP layer. A response with any status code,
/// including 4xx/5xx, is not a transport error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TransportError {
    /// The request timed out.
    #[error("request timed out after {timeout_ms} ms")]
    Timeout {
        /// Timeout that elapsed.
        timeout_ms: u64,
    },

    /// Could not connect to the host.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// The URL could not be parsed.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// Any other failure.
    #[error("{0}")]
    Other(String),
}

/// Port for sending HTTP requests.
///
/// This trait abstracts the HTTP client implementation, allowing
/// the application layer to be independent of specific HTTP libraries.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Sends the request and returns whatever response the server gave.
    ///
    /// # Errors
    ///
    /// Returns an error only if no response was received.
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError>;
}
