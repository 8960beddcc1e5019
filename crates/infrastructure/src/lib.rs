//! RingCentral Infrastructure - Adapters and implementations
//!
//! This crate provides concrete implementations of the ports
//! defined in the application layer, plus configuration loading.

pub mod adapters;
pub mod persistence;
pub mod settings;

pub use adapters::{ReqwestTransport, SystemClock};
pub use persistence::FileTokenStore;
pub use settings::{ConfigError, ConfigLoader, Settings};
