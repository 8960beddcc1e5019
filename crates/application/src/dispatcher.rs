//! Authenticated request dispatch.
//!
//! Every call resolves an access token through the [`TokenManager`],
//! attaches it as a bearer credential and sends the request. Non-2xx
//! responses never reach the caller; they become [`ClientError::Api`].

use std::sync::Arc;

use ringcentral_domain::{
    ApiRequest, ApiResponse, DomainError, Header, HttpMethod, RequestBody, RingCentralConfig,
};
use tracing::{debug, warn};

use crate::auth::TokenManager;
use crate::error::{ClientError, ClientResult};
use crate::ports::{HttpTransport, TokenStore};

/// Per-call options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestOptions {
    /// Extra headers sent after the bearer credential.
    pub headers: Vec<Header>,
    /// Prepend `{server_url}/restapi/{version}` to the path. When false the
    /// path is used verbatim, for endpoints on other hosts such as media
    /// downloads.
    pub prefix: bool,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            headers: Vec::new(),
            prefix: true,
        }
    }
}

impl RequestOptions {
    /// Options for an absolute URL.
    #[must_use]
    pub fn absolute() -> Self {
        Self {
            headers: Vec::new(),
            prefix: false,
        }
    }

    /// Adds an extra header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push(Header::new(name, value));
        self
    }
}

/// Bearer-authenticated GET/POST/DELETE against the REST API.
#[derive(Clone)]
pub struct Dispatcher {
    config: Arc<RingCentralConfig>,
    tokens: TokenManager,
    transport: Arc<dyn HttpTransport>,
}

impl Dispatcher {
    /// Creates a dispatcher.
    #[must_use]
    pub fn new(
        config: RingCentralConfig,
        store: Arc<dyn TokenStore>,
        transport: Arc<dyn HttpTransport>,
    ) -> Self {
        let config = Arc::new(config);
        let tokens = TokenManager::new(config.clone(), store, transport.clone());
        Self {
            config,
            tokens,
            transport,
        }
    }

    /// The configuration this dispatcher was built with.
    #[must_use]
    pub fn config(&self) -> &RingCentralConfig {
        &self.config
    }

    /// The token manager.
    #[must_use]
    pub const fn tokens(&self) -> &TokenManager {
        &self.tokens
    }

    /// Builds the final URL for `path`.
    ///
    /// # Errors
    /// Returns [`DomainError::InvalidUrl`] if a prefixed path does not start
    /// with `/`.
    pub fn url_for(&self, path: &str, prefix: bool) -> Result<String, DomainError> {
        if !prefix {
            return Ok(path.to_string());
        }
        if !path.starts_with('/') {
            return Err(DomainError::InvalidUrl(format!(
                "API path must start with '/': {path}"
            )));
        }
        Ok(format!("{}{path}", self.config.rest_base()))
    }

    /// Sends a GET request with query parameters.
    ///
    /// # Errors
    /// See [`Dispatcher::dispatch`].
    pub async fn get(
        &self,
        path: &str,
        query: Vec<(String, String)>,
        options: RequestOptions,
    ) -> ClientResult<ApiResponse> {
        let request = ApiRequest::new(HttpMethod::Get, self.url_for(path, options.prefix)?)
            .with_query(query);
        self.dispatch(request, options.headers).await
    }

    /// Sends a POST request with a body.
    ///
    /// # Errors
    /// See [`Dispatcher::dispatch`].
    pub async fn post(
        &self,
        path: &str,
        body: RequestBody,
        options: RequestOptions,
    ) -> ClientResult<ApiResponse> {
        let request =
            ApiRequest::new(HttpMethod::Post, self.url_for(path, options.prefix)?).with_body(body);
        self.dispatch(request, options.headers).await
    }

    /// Sends a DELETE request.
    ///
    /// # Errors
    /// See [`Dispatcher::dispatch`].
    pub async fn delete(&self, path: &str, options: RequestOptions) -> ClientResult<ApiResponse> {
        let request = ApiRequest::new(HttpMethod::Delete, self.url_for(path, options.prefix)?);
        self.dispatch(request, options.headers).await
    }

    /// Authenticates and sends `request`.
    ///
    /// # Errors
    /// - [`ClientError::Auth`] if no access token could be obtained
    /// - [`ClientError::Transport`] if no response was received
    /// - [`ClientError::Api`] for any non-2xx response
    pub async fn dispatch(
        &self,
        request: ApiRequest,
        headers: Vec<Header>,
    ) -> ClientResult<ApiResponse> {
        let token = self.tokens.access_token().await?;

        let mut request = request.with_header("Authorization", format!("Bearer {token}"));
        request.headers.extend(headers);

        let method = request.method;
        let url = request.url.clone();
        debug!(%method, %url, "dispatching request");

        let response = self.transport.send(request).await?;

        if !response.is_success() {
            let status = response.status.as_u16();
            let message = response.error_message();
            warn!(%method, %url, status, %message, "API request failed");
            return Err(ClientError::Api { status, message });
        }

        Ok(response)
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("rest_base", &self.config.rest_base())
            .field("tokens", &self.tokens)
            .finish_non_exhaustive()
    }
}
