//! RingCentral Domain - Core types
//!
//! This crate defines the domain model for the RingCentral REST client.
//! All types here are pure Rust with no I/O dependencies.

pub mod auth;
pub mod call_log;
pub mod config;
pub mod error;
pub mod extension;
pub mod message;
pub mod request;
pub mod response;
pub mod webhook;

pub use auth::{
    GrantType, TokenGrant, TokenKind, TokenResponse, TokenState, expires_after,
    token_preview,
};
pub use call_log::{CallLogQuery, CallLogRecord, CallLogView, Recording};
pub use config::{Credentials, RingCentralConfig};
pub use error::{DomainError, DomainResult};
pub use extension::{Extension, ExtensionContact};
pub use message::{Message, MessageAttachment, MessageQuery, PhoneEndpoint, RecordList, SmsMessage};
pub use request::{ApiRequest, Header, HttpMethod, RequestBody};
pub use response::{ApiResponse, StatusCode};
pub use webhook::{
    CallDirection, CreateWebhook, DeliveryMode, Subscription, WebhookRecord, verify_token,
};
