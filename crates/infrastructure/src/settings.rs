//! Configuration loading.
//!
//! Settings come from an optional TOML file, then `RINGCENTRAL_*`
//! environment variables, later sources winning:
//!
//! | key | env var |
//! |---|---|
//! | `client_id` | `RINGCENTRAL_CLIENT_ID` |
//! | `client_secret` | `RINGCENTRAL_CLIENT_SECRET` |
//! | `server_url` | `RINGCENTRAL_SERVER_URL` |
//! | `jwt` | `RINGCENTRAL_JWT` |
//! | `verification_token` | `RINGCENTRAL_VERIFICATION_TOKEN` |
//! | `access_token_ttl` | `RINGCENTRAL_ACCESS_TOKEN_TTL` |
//! | `refresh_token_ttl` | `RINGCENTRAL_REFRESH_TOKEN_TTL` |
//! | `api_version` | `RINGCENTRAL_API_VERSION` |
//! | `token_file` | `RINGCENTRAL_TOKEN_FILE` |

use std::collections::HashMap;
use std::path::PathBuf;

use config::{Environment, File, FileFormat};
use ringcentral_domain::config::{
    DEFAULT_ACCESS_TOKEN_TTL, DEFAULT_API_VERSION, DEFAULT_REFRESH_TOKEN_TTL,
};
use ringcentral_domain::{Credentials, DomainError, RingCentralConfig};
use serde::Deserialize;

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "RINGCENTRAL";

/// Default token cache location, relative to the working directory.
pub const DEFAULT_TOKEN_FILE: &str = ".ringcentral/tokens.json";

/// Errors raised while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A source could not be read or a value had the wrong type.
    #[error("failed to load configuration: {0}")]
    Source(#[from] config::ConfigError),

    /// Values were read but do not form a valid configuration.
    #[error("invalid configuration: {0}")]
    Invalid(#[from] DomainError),
}

/// Raw settings as read from file and environment.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// OAuth client id.
    pub client_id: String,
    /// OAuth client secret.
    pub client_secret: String,
    /// Platform base URL.
    pub server_url: String,
    /// JWT assertion.
    pub jwt: String,
    /// Webhook verification token.
    pub verification_token: Option<String>,
    /// Access token lifetime requested at login.
    pub access_token_ttl: Option<u64>,
    /// Refresh token lifetime requested at login.
    pub refresh_token_ttl: Option<u64>,
    /// REST API version segment.
    pub api_version: Option<String>,
    /// Where the file token store keeps tokens.
    pub token_file: Option<PathBuf>,
}

impl Settings {
    /// Validates the settings into a client configuration.
    ///
    /// # Errors
    /// Returns [`ConfigError::Invalid`] if a credential is missing or the
    /// server URL is malformed.
    pub fn to_config(&self) -> Result<RingCentralConfig, ConfigError> {
        let credentials = Credentials::new(
            self.client_id.clone(),
            self.client_secret.clone(),
            self.server_url.clone(),
            self.jwt.clone(),
        )?;

        let mut config = RingCentralConfig::new(credentials).with_token_ttls(
            self.access_token_ttl.unwrap_or(DEFAULT_ACCESS_TOKEN_TTL),
            self.refresh_token_ttl.unwrap_or(DEFAULT_REFRESH_TOKEN_TTL),
        );
        if let Some(token) = &self.verification_token {
            config = config.with_verification_token(token.clone());
        }
        config.api_version = self
            .api_version
            .clone()
            .unwrap_or_else(|| DEFAULT_API_VERSION.to_string());
        Ok(config)
    }

    /// Token file location, falling back to [`DEFAULT_TOKEN_FILE`].
    #[must_use]
    pub fn token_file(&self) -> PathBuf {
        self.token_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_TOKEN_FILE))
    }
}

/// Builds [`Settings`] from layered sources.
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    file: Option<PathBuf>,
    env: Option<HashMap<String, String>>,
}

impl ConfigLoader {
    /// Loader reading only the process environment.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Also reads `path` (TOML) if it exists. Environment variables still
    /// take precedence.
    #[must_use]
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self
    }

    /// Reads variables from `vars` instead of the process environment.
    #[must_use]
    pub fn with_env(mut self, vars: HashMap<String, String>) -> Self {
        self.env = Some(vars);
        self
    }

    /// Loads raw settings.
    ///
    /// # Errors
    /// Returns [`ConfigError::Source`] if the file is unreadable or a value
    /// has the wrong type.
    pub fn load_settings(&self) -> Result<Settings, ConfigError> {
        let mut builder = config::Config::builder();

        if let Some(path) = &self.file {
            builder = builder.add_source(
                File::from(path.as_path())
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .try_parsing(true)
                .source(self.env.clone()),
        );

        Ok(builder.build()?.try_deserialize()?)
    }

    /// Loads and validates the client configuration.
    ///
    /// # Errors
    /// See [`ConfigLoader::load_settings`] and [`Settings::to_config`].
    pub fn load(&self) -> Result<RingCentralConfig, ConfigError> {
        self.load_settings()?.to_config()
    }
}
