//! Authentication domain types

mod types;

pub use types::{
    GrantType, TokenGrant, TokenKind, TokenResponse, TokenState, expires_after, token_preview,
};
