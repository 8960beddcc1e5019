//! Access token lifecycle.
//!
//! The token store is consulted on every call; nothing is cached on the
//! manager itself, so dispatchers in other processes sharing the store see
//! the same tokens.

use std::sync::Arc;

use base64::Engine;
use ringcentral_domain::{
    ApiRequest, HttpMethod, RequestBody, RingCentralConfig, TokenGrant, TokenKind, TokenResponse,
    TokenState, token_preview,
};
use tracing::{debug, info};

use crate::error::{ClientError, ClientResult};
use crate::ports::{HttpTransport, TokenStore};

/// Obtains access tokens: from the store, by refresh, or by JWT login.
#[derive(Clone)]
pub struct TokenManager {
    config: Arc<RingCentralConfig>,
    store: Arc<dyn TokenStore>,
    transport: Arc<dyn HttpTransport>,
}

impl TokenManager {
    /// Creates a token manager.
    #[must_use]
    pub fn new(
        config: Arc<RingCentralConfig>,
        store: Arc<dyn TokenStore>,
        transport: Arc<dyn HttpTransport>,
    ) -> Self {
        Self {
            config,
            store,
            transport,
        }
    }

    fn key(&self, kind: TokenKind) -> String {
        kind.store_key(&self.config.credentials)
    }

    /// Reads the store and reports which tokens are available.
    ///
    /// # Errors
    /// Returns [`ClientError::Store`] if the store cannot be read.
    pub async fn state(&self) -> ClientResult<TokenState> {
        let access_key = self.key(TokenKind::Access);
        if self.store.has(&access_key).await?
            && let Some(token) = self.store.get(&access_key).await?
        {
            return Ok(TokenState::HaveAccessToken(token));
        }

        let refresh_key = self.key(TokenKind::Refresh);
        if self.store.has(&refresh_key).await?
            && let Some(token) = self.store.get(&refresh_key).await?
        {
            return Ok(TokenState::HaveRefreshOnly(token));
        }

        Ok(TokenState::NoTokens)
    }

    /// Returns a currently valid access token.
    ///
    /// A cached access token is returned as is. Otherwise a cached refresh
    /// token is exchanged, and failing that a JWT login is performed.
    ///
    /// # Errors
    /// Returns [`ClientError::Auth`] if the token endpoint rejects the
    /// request, or a transport/store error.
    pub async fn access_token(&self) -> ClientResult<String> {
        match self.state().await? {
            TokenState::HaveAccessToken(token) => {
                debug!("using cached access token");
                Ok(token)
            }
            TokenState::HaveRefreshOnly(refresh_token) => {
                debug!("access token missing, refreshing");
                self.refresh(&refresh_token).await
            }
            TokenState::NoTokens => {
                debug!("no cached tokens, logging in");
                self.login().await
            }
        }
    }

    /// Performs the JWT bearer login and stores both tokens.
    ///
    /// # Errors
    /// Returns [`ClientError::Auth`] on a non-2xx response or an unreadable
    /// token body.
    pub async fn login(&self) -> ClientResult<String> {
        let grant = TokenGrant::Jwt {
            assertion: self.config.credentials.jwt().to_string(),
            access_token_ttl: self.config.access_token_ttl,
            refresh_token_ttl: self.config.refresh_token_ttl,
        };
        let response = self.request_token(grant).await?;

        self.store
            .put(
                &self.key(TokenKind::Access),
                &response.access_token,
                response.expires_in,
            )
            .await?;

        if let Some(refresh_token) = &response.refresh_token {
            let ttl = response
                .refresh_token_expires_in
                .unwrap_or(self.config.refresh_token_ttl);
            self.store
                .put(&self.key(TokenKind::Refresh), refresh_token, ttl)
                .await?;
        }

        info!(
            client_id = self.config.credentials.client_id(),
            token = %token_preview(&response.access_token),
            expires_in = response.expires_in,
            "logged in with JWT"
        );
        Ok(response.access_token)
    }

    /// Exchanges `refresh_token` for a new access token and stores it.
    ///
    /// Only the access token is written; the refresh token in the store is
    /// left untouched even if the server issues a new one.
    ///
    /// # Errors
    /// Returns [`ClientError::Auth`] on a non-2xx response or an unreadable
    /// token body.
    pub async fn refresh(&self, refresh_token: &str) -> ClientResult<String> {
        let grant = TokenGrant::Refresh {
            refresh_token: refresh_token.to_string(),
            access_token_ttl: self.config.access_token_ttl,
            refresh_token_ttl: self.config.refresh_token_ttl,
        };
        let response = self.request_token(grant).await?;

        self.store
            .put(
                &self.key(TokenKind::Access),
                &response.access_token,
                response.expires_in,
            )
            .await?;

        info!(
            client_id = self.config.credentials.client_id(),
            token = %token_preview(&response.access_token),
            expires_in = response.expires_in,
            "refreshed access token"
        );
        Ok(response.access_token)
    }

    fn basic_authorization(&self) -> String {
        let credentials = &self.config.credentials;
        let raw = format!("{}:{}", credentials.client_id(), credentials.client_secret());
        let encoded = base64::engine::general_purpose::STANDARD.encode(raw.as_bytes());
        format!("Basic {encoded}")
    }

    async fn request_token(&self, grant: TokenGrant) -> ClientResult<TokenResponse> {
        let request = ApiRequest::new(HttpMethod::Post, self.config.token_endpoint())
            .with_header("Authorization", self.basic_authorization())
            .with_header("Accept", "application/json")
            .with_body(RequestBody::Form(grant.form_fields()));

        let response = self.transport.send(request).await?;

        if !response.is_success() {
            return Err(ClientError::Auth {
                status: Some(response.status.as_u16()),
                message: response.error_message(),
            });
        }

        response.json::<TokenResponse>().map_err(|e| ClientError::Auth {
            status: Some(response.status.as_u16()),
            message: e.to_string(),
        })
    }
}

impl std::fmt::Debug for TokenManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenManager")
            .field("client_id", &self.config.credentials.client_id())
            .finish_non_exhaustive()
    }
}
