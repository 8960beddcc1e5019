//! Application error types

use ringcentral_domain::DomainError;
use thiserror::Error;

use crate::ports::{StoreError, TransportError};

/// Coarse classification of a [`ClientError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The token endpoint refused the credentials.
    Auth,
    /// A dispatched API call returned a non-2xx status.
    Api,
    /// Input was rejected before any network call.
    InvalidInput,
    /// No HTTP response was received.
    Transport,
    /// The token store failed.
    Store,
    /// A successful response had an unexpected body.
    Decode,
    /// An inbound webhook failed verification.
    Verification,
}

/// Client-level errors.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Login or refresh against the token endpoint failed.
    #[error("authentication failed: {message}")]
    Auth {
        /// HTTP status from the token endpoint, if one was received.
        status: Option<u16>,
        /// Upstream error message.
        message: String,
    },

    /// An API call returned a non-success status.
    #[error("API request failed with status {status}: {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Upstream error message.
        message: String,
    },

    /// Input validation failed.
    #[error("invalid input: {0}")]
    InvalidInput(#[from] DomainError),

    /// The transport could not deliver the request.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The token store failed.
    #[error("token store error: {0}")]
    Store(#[from] StoreError),

    /// A response body could not be decoded.
    #[error("unexpected response: {0}")]
    Decode(String),

    /// Inbound webhook carried a missing or wrong verification token.
    #[error("webhook verification token rejected")]
    WebhookVerification,
}

impl ClientError {
    /// Returns the error's kind.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Auth { .. } => ErrorKind::Auth,
            Self::Api { .. } => ErrorKind::Api,
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
            Self::Transport(_) => ErrorKind::Transport,
            Self::Store(_) => ErrorKind::Store,
            Self::Decode(_) => ErrorKind::Decode,
            Self::WebhookVerification => ErrorKind::Verification,
        }
    }

    /// Upstream HTTP status, if the error came from a response.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Auth { status, .. } => *status,
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result type alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;
