//! Authentication module.
//!
//! This module provides:
//! - In-memory token storage with per-entry expiry
//! - The token manager driving JWT login and refresh

mod in_memory;
mod token_manager;

pub use in_memory::InMemoryTokenStore;
pub use token_manager::TokenManager;
