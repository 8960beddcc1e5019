//! Port definitions (interfaces)
//!
//! Ports define the boundaries between the application core and external systems.
//! Each port is a trait that can be implemented by adapters in the infrastructure layer.

mod clock;
mod http_transport;
mod token_store;

pub use clock::Clock;
pub use http_transport::{HttpTransport, TransportError};
pub use token_store::{StoreError, TokenStore};
