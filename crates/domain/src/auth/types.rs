//! Token endpoint types and token lifecycle states.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::Credentials;

/// OAuth grant types understood by the RingCentral token endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrantType {
    /// Exchange a signed JWT assertion for a token pair.
    JwtBearer,
    /// Mint a new access token from a refresh token.
    RefreshToken,
}

impl GrantType {
    /// The wire value of the `grant_type` form field.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::JwtBearer => "urn:ietf:params:oauth:grant-type:jwt-bearer",
            Self::RefreshToken => "refresh_token",
        }
    }
}

/// A token request body, serialized as form fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenGrant {
    /// JWT bearer login.
    Jwt {
        /// Signed JWT assertion.
        assertion: String,
        /// Requested access token lifetime in seconds.
        access_token_ttl: u64,
        /// Requested refresh token lifetime in seconds.
        refresh_token_ttl: u64,
    },
    /// Refresh of an access token.
    Refresh {
        /// The refresh token to exchange.
        refresh_token: String,
        /// Requested access token lifetime in seconds.
        access_token_ttl: u64,
        /// Requested refresh token lifetime in seconds.
        refresh_token_ttl: u64,
    },
}

impl TokenGrant {
    /// Returns the grant type of this request.
    #[must_use]
    pub const fn grant_type(&self) -> GrantType {
        match self {
            Self::Jwt { .. } => GrantType::JwtBearer,
            Self::Refresh { .. } => GrantType::RefreshToken,
        }
    }

    /// Form fields in the order they are sent.
    #[must_use]
    pub fn form_fields(&self) -> Vec<(String, String)> {
        let mut fields = vec![(
            "grant_type".to_string(),
            self.grant_type().as_str().to_string(),
        )];
        match self {
            Self::Jwt {
                assertion,
                access_token_ttl,
                refresh_token_ttl,
            } => {
                fields.push(("assertion".to_string(), assertion.clone()));
                fields.push(("access_token_ttl".to_string(), access_token_ttl.to_string()));
                fields.push(("refresh_token_ttl".to_string(), refresh_token_ttl.to_string()));
            }
            Self::Refresh {
                refresh_token,
                access_token_ttl,
                refresh_token_ttl,
            } => {
                fields.push(("refresh_token".to_string(), refresh_token.clone()));
                fields.push(("access_token_ttl".to_string(), access_token_ttl.to_string()));
                fields.push(("refresh_token_ttl".to_string(), refresh_token_ttl.to_string()));
            }
        }
        fields
    }
}

/// Successful token endpoint response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    /// The bearer token.
    pub access_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: u64,
    /// Refresh token, if issued.
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Refresh token lifetime in seconds.
    #[serde(default)]
    pub refresh_token_expires_in: Option<u64>,
    /// Token type, normally `bearer`.
    #[serde(default)]
    pub token_type: Option<String>,
}

/// Which of the two cached tokens a store entry holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Short-lived bearer token.
    Access,
    /// Long-lived refresh token.
    Refresh,
}

impl TokenKind {
    /// Store key for this token kind, scoped to a credential set so that two
    /// applications sharing one store never read each other's tokens.
    #[must_use]
    pub fn store_key(self, credentials: &Credentials) -> String {
        let suffix = match self {
            Self::Access => "access_token",
            Self::Refresh => "refresh_token",
        };
        format!("ringcentral:{}:{suffix}", credentials.client_id())
    }
}

/// What the token store currently holds, deciding the next action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenState {
    /// A live access token is cached.
    HaveAccessToken(String),
    /// Only the refresh token survives.
    HaveRefreshOnly(String),
    /// Nothing cached; a full login is required.
    NoTokens,
}

/// Instant `ttl_seconds` after `now`, saturating at the maximum date.
#[must_use]
pub fn expires_after(now: DateTime<Utc>, ttl_seconds: u64) -> DateTime<Utc> {
    i64::try_from(ttl_seconds)
        .ok()
        .and_then(chrono::Duration::try_seconds)
        .and_then(|ttl| now.checked_add_signed(ttl))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Short token preview for log output (first 8 chars + `...`).
#[must_use]
pub fn token_preview(token: &str) -> String {
    match token.char_indices().nth(8) {
        Some((idx, _)) if token.len() > 12 => format!("{}...", &token[..idx]),
        _ => "***".to_string(),
    }
}
