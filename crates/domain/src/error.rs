//! Domain error types

use thiserror::Error;

/// Domain-level errors raised while validating input or decoding payloads.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A required field was missing or empty.
    #[error("missing field: {0}")]
    MissingField(&'static str),

    /// The provided URL is invalid or malformed.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// An inbound or upstream payload did not have the expected shape.
    #[error("invalid payload: {0}")]
    InvalidPayload(String),
}

/// Result type alias for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
