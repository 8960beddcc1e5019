//! Client configuration.
//!
//! Configuration is built once at startup and handed to the dispatcher by
//! value. Nothing in it changes after construction.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{DomainError, DomainResult};

/// Default lifetime requested for access tokens, in seconds.
pub const DEFAULT_ACCESS_TOKEN_TTL: u64 = 3600;

/// Default lifetime requested for refresh tokens, in seconds (one week).
pub const DEFAULT_REFRESH_TOKEN_TTL: u64 = 604_800;

/// Default REST API version segment.
pub const DEFAULT_API_VERSION: &str = "v1.0";

/// Application credentials issued by the RingCentral developer console.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    client_id: String,
    client_secret: String,
    server_url: String,
    jwt: String,
}

impl Credentials {
    /// Creates validated credentials.
    ///
    /// The server URL must be an absolute `http` or `https` URL; a trailing
    /// slash is removed so paths can be appended directly.
    ///
    /// # Errors
    /// Returns [`DomainError::MissingField`] for empty values and
    /// [`DomainError::InvalidUrl`] for a malformed server URL.
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        server_url: impl Into<String>,
        jwt: impl Into<String>,
    ) -> DomainResult<Self> {
        let client_id = non_empty(client_id.into(), "client_id")?;
        let client_secret = non_empty(client_secret.into(), "client_secret")?;
        let jwt = non_empty(jwt.into(), "jwt")?;
        let server_url = non_empty(server_url.into(), "server_url")?;

        let parsed = Url::parse(&server_url)
            .map_err(|e| DomainError::InvalidUrl(format!("{e}: {server_url}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(DomainError::InvalidUrl(format!(
                "unsupported scheme '{}': {server_url}",
                parsed.scheme()
            )));
        }

        Ok(Self {
            client_id,
            client_secret,
            server_url: server_url.trim_end_matches('/').to_string(),
            jwt,
        })
    }

    /// The application client id.
    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// The application client secret.
    #[must_use]
    pub fn client_secret(&self) -> &str {
        &self.client_secret
    }

    /// The server base URL without a trailing slash.
    #[must_use]
    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    /// The JWT assertion used for the bearer grant.
    #[must_use]
    pub fn jwt(&self) -> &str {
        &self.jwt
    }
}

// Secrets stay out of debug output.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("server_url", &self.server_url)
            .field("jwt", &"<redacted>")
            .finish()
    }
}

fn non_empty(value: String, field: &'static str) -> DomainResult<String> {
    if value.trim().is_empty() {
        Err(DomainError::MissingField(field))
    } else {
        Ok(value)
    }
}

/// Full client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RingCentralConfig {
    /// Application credentials.
    pub credentials: Credentials,
    /// Token expected in the `verification-token` header of inbound webhooks.
    pub verification_token: Option<String>,
    /// Requested access token lifetime in seconds.
    pub access_token_ttl: u64,
    /// Requested refresh token lifetime in seconds.
    pub refresh_token_ttl: u64,
    /// REST API version segment, e.g. `v1.0`.
    pub api_version: String,
}

impl RingCentralConfig {
    /// Creates a configuration with default token lifetimes.
    #[must_use]
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            verification_token: None,
            access_token_ttl: DEFAULT_ACCESS_TOKEN_TTL,
            refresh_token_ttl: DEFAULT_REFRESH_TOKEN_TTL,
            api_version: DEFAULT_API_VERSION.to_string(),
        }
    }

    /// Sets the webhook verification token.
    #[must_use]
    pub fn with_verification_token(mut self, token: impl Into<String>) -> Self {
        let token = token.into();
        self.verification_token = (!token.is_empty()).then_some(token);
        self
    }

    /// Sets the requested token lifetimes.
    #[must_use]
    pub const fn with_token_ttls(mut self, access: u64, refresh: u64) -> Self {
        self.access_token_ttl = access;
        self.refresh_token_ttl = refresh;
        self
    }

    /// Base path every prefixed request is built from:
    /// `{server_url}/restapi/{api_version}`.
    #[must_use]
    pub fn rest_base(&self) -> String {
        format!(
            "{}/restapi/{}",
            self.credentials.server_url(),
            self.api_version
        )
    }

    /// OAuth token endpoint.
    #[must_use]
    pub fn token_endpoint(&self) -> String {
        format!("{}/restapi/oauth/token", self.credentials.server_url())
    }
}
