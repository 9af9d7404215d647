//! Snap client configuration.
//!
//! Selects the gateway environment and resolves the two origins the client
//! talks to: the Snap origin (transaction creation) and the Core API origin
//! (status and cancel). Both origins always come from the same environment.
//! Override them explicitly for local mocks or egress proxies.

use std::time::Duration;

use reqwest::header::{HeaderName, HeaderValue};
use url::Url;

use crate::credentials::Credentials;
use crate::transport::RequestOptions;

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Gateway environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Environment {
    #[default]
    Sandbox,
    Production,
}

impl Environment {
    /// Origin serving `/snap/v1/transactions`.
    pub fn snap_origin(&self) -> &'static str {
        match self {
            Self::Sandbox => "https://app.sandbox.midtrans.com",
            Self::Production => "https://app.midtrans.com",
        }
    }

    /// Origin serving the `/v2/{order_id}/...` Core API.
    pub fn core_api_origin(&self) -> &'static str {
        match self {
            Self::Sandbox => "https://api.sandbox.midtrans.com",
            Self::Production => "https://api.midtrans.com",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sandbox => "sandbox",
            Self::Production => "production",
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sandbox" => Ok(Self::Sandbox),
            "production" => Ok(Self::Production),
            other => Err(ConfigError::UnknownEnvironment(other.to_string())),
        }
    }
}

/// Resolved base URLs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub snap: Url,
    pub core_api: Url,
}

impl Endpoints {
    /// The fixed origins of `environment`.
    pub fn for_environment(environment: Environment) -> Result<Self, ConfigError> {
        Ok(Self {
            snap: parse_url("snap", environment.snap_origin())?,
            core_api: parse_url("core_api", environment.core_api_origin())?,
        })
    }

    /// Point both APIs at one origin (local mocks, egress proxies).
    pub fn single(base: &str) -> Result<Self, ConfigError> {
        let url = parse_url("base", base)?;
        Ok(Self {
            snap: url.clone(),
            core_api: url,
        })
    }
}

/// Configuration for a [`SnapClient`](crate::SnapClient).
///
/// Custom `Debug` is inherited from [`Credentials`], which redacts the keys.
#[derive(Debug, Clone)]
pub struct SnapConfig {
    pub environment: Environment,
    pub endpoints: Endpoints,
    pub credentials: Credentials,
    /// Request timeout used when building the default transport.
    pub timeout_secs: u64,
    /// Options applied to every request, below any per-call overrides.
    pub defaults: RequestOptions,
}

impl SnapConfig {
    /// Configuration for `environment` with its fixed origins.
    pub fn new(environment: Environment, credentials: Credentials) -> Result<Self, ConfigError> {
        if environment == Environment::Production && credentials.looks_like_sandbox() {
            tracing::warn!("sandbox server key configured for the production environment");
        }
        Ok(Self {
            environment,
            endpoints: Endpoints::for_environment(environment)?,
            credentials,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            defaults: RequestOptions::default(),
        })
    }

    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `SNAP_ENVIRONMENT` (`sandbox` | `production`, default: `sandbox`)
    /// - `SNAP_SERVER_KEY` (required)
    /// - `SNAP_CLIENT_KEY` (optional)
    /// - `SNAP_TIMEOUT_SECS` (default: 30)
    /// - `SNAP_NOTIFICATION_URL` (optional, sent as `X-Override-Notification`)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = match lookup("SNAP_ENVIRONMENT") {
            Some(raw) => raw.parse()?,
            None => Environment::default(),
        };

        let server_key = lookup("SNAP_SERVER_KEY").ok_or(ConfigError::MissingServerKey)?;
        let mut credentials = Credentials::new(server_key)?;
        if let Some(client_key) = lookup("SNAP_CLIENT_KEY").filter(|k| !k.is_empty()) {
            credentials = credentials.with_client_key(client_key);
        }

        let mut config = Self::new(environment, credentials)?;
        config.timeout_secs = lookup("SNAP_TIMEOUT_SECS")
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        if let Some(url) = lookup("SNAP_NOTIFICATION_URL").filter(|u| !u.is_empty()) {
            config = config.with_default_header("x-override-notification", &url)?;
        }

        Ok(config)
    }

    /// Replace the resolved endpoints.
    pub fn with_endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Add a header sent with every request.
    pub fn with_default_header(mut self, name: &str, value: &str) -> Result<Self, ConfigError> {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| ConfigError::InvalidHeader(name.to_string()))?;
        let header_value =
            HeaderValue::from_str(value).map_err(|_| ConfigError::InvalidHeader(name.to_string()))?;
        self.defaults.headers.insert(header_name, header_value);
        Ok(self)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn parse_url(label: &str, raw: &str) -> Result<Url, ConfigError> {
    let url =
        Url::parse(raw).map_err(|e| ConfigError::InvalidUrl(label.to_string(), e.to_string()))?;
    if url.cannot_be_a_base() {
        return Err(ConfigError::InvalidUrl(
            label.to_string(),
            "URL cannot carry a path".to_string(),
        ));
    }
    Ok(url)
}

/// Configuration and construction errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("SNAP_SERVER_KEY is required and must not be blank")]
    MissingServerKey,
    #[error("server key contains characters not allowed in an HTTP header")]
    InvalidServerKey,
    #[error("unknown environment {0:?} (expected \"sandbox\" or \"production\")")]
    UnknownEnvironment(String),
    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(String, String),
    #[error("invalid header {0}")]
    InvalidHeader(String),
    #[error("failed to compile {kind} response schema: {reason}")]
    Schema { kind: &'static str, reason: String },
    #[error("failed to build HTTP transport: {0}")]
    Transport(#[from] reqwest::Error),
}
