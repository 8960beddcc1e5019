//! RingCentral Application - Token lifecycle, dispatch and API operations
//!
//! This crate defines the application layer with:
//! - Port traits (token store, HTTP transport, clock)
//! - The token manager (JWT login, refresh, cached tokens)
//! - The authenticated request dispatcher
//! - The high-level RingCentral client
//! - Application-level error handling

pub mod auth;
pub mod client;
pub mod dispatcher;
pub mod error;
pub mod ports;

#[cfg(test)]
pub(crate) mod test_support;

pub use auth::{InMemoryTokenStore, TokenManager};
pub use client::RingCentralClient;
pub use dispatcher::{Dispatcher, RequestOptions};
pub use error::{ClientError, ClientResult, ErrorKind};
pub use ports::{Clock, HttpTransport, StoreError, TokenStore, TransportError};
