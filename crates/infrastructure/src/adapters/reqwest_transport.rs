//! HTTP transport implementation using reqwest.
//!
//! This adapter implements the `HttpTransport` port. It only moves bytes:
//! status handling and authentication live in the application layer.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, Url};
use ringcentral_application::ports::{HttpTransport, TransportError};
use ringcentral_domain::{ApiRequest, ApiResponse, HttpMethod, RequestBody};
use tracing::trace;

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// HTTP transport backed by `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
    timeout_ms: u64,
}

impl ReqwestTransport {
    /// Creates a transport with default settings.
    ///
    /// Default configuration:
    /// - Request timeout: 30 seconds
    /// - Follow redirects: up to 10
    /// - User-Agent: "ringcentral-rs/{version}"
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be created.
    pub fn new() -> Result<Self, TransportError> {
        let client = Client::builder()
            .user_agent(concat!("ringcentral-rs/", env!("CARGO_PKG_VERSION")))
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(|e| TransportError::Other(e.to_string()))?;

        Ok(Self {
            client,
            timeout_ms: DEFAULT_TIMEOUT_MS,
        })
    }

    /// Wraps an existing reqwest client.
    #[must_use]
    pub const fn with_client(client: Client) -> Self {
        Self {
            client,
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }

    /// Overrides the per-request timeout.
    #[must_use]
    pub const fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    const fn to_reqwest_method(method: HttpMethod) -> Method {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Delete => Method::DELETE,
        }
    }

    fn build_url(url: &str, query: &[(String, String)]) -> Result<Url, TransportError> {
        let mut parsed =
            Url::parse(url).map_err(|e| TransportError::InvalidUrl(format!("{e}: {url}")))?;
        if !query.is_empty() {
            parsed.query_pairs_mut().extend_pairs(query);
        }
        Ok(parsed)
    }

    fn encode_body(body: &RequestBody) -> Result<Option<Vec<u8>>, TransportError> {
        match body {
            RequestBody::None => Ok(None),
            RequestBody::Json(raw) => Ok(Some(raw.clone().into_bytes())),
            RequestBody::Form(fields) => serde_urlencoded::to_string(fields)
                .map(|s| Some(s.into_bytes()))
                .map_err(|e| TransportError::Other(format!("form encoding failed: {e}"))),
        }
    }

    fn map_error(error: &reqwest::Error, timeout_ms: u64) -> TransportError {
        if error.is_timeout() {
            return TransportError::Timeout { timeout_ms };
        }
        if error.is_connect() {
            return TransportError::ConnectionFailed(error.to_string());
        }
        if error.is_builder() {
            return TransportError::InvalidUrl(error.to_string());
        }
        TransportError::Other(error.to_string())
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        let url = Self::build_url(&request.url, &request.query)?;

        let mut builder = self
            .client
            .request(Self::to_reqwest_method(request.method), url)
            .timeout(Duration::from_millis(self.timeout_ms));

        for header in &request.headers {
            builder = builder.header(&header.name, &header.value);
        }

        if let Some(content_type) = request.body.content_type()
            && request.header("content-type").is_none()
        {
            builder = builder.header("Content-Type", content_type);
        }

        if let Some(bytes) = Self::encode_body(&request.body)? {
            builder = builder.body(bytes);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| Self::map_error(&e, self.timeout_ms))?;

        let status = response.status().as_u16();
        let headers: HashMap<String, String> = response
            .headers()
            .iter()
            .map(|(k, v)| (k.as_str().to_string(), v.to_str().unwrap_or("<binary>").to_string()))
            .collect();

        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::Other(format!("Failed to read body: {e}")))?
            .to_vec();

        trace!(status, bytes = body.len(), "response received");
        Ok(ApiResponse::new(status, headers, body))
    }
}
