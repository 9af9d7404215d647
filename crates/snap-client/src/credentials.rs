//! Merchant credentials.
//!
//! The server key authorizes every Snap and Core API call using HTTP Basic
//! authentication with the key as username and an empty password. The client
//! key is only needed by browser-side Snap integrations and is carried for
//! callers that render the payment popup themselves.

use base64::engine::general_purpose::STANDARD as BASE64_ENGINE;
use base64::Engine;
use reqwest::header::HeaderValue;
use zeroize::Zeroizing;

use crate::config::ConfigError;

/// Server key and optional client key.
///
/// Custom `Debug` implementation redacts both keys.
#[derive(Clone)]
pub struct Credentials {
    server_key: Zeroizing<String>,
    client_key: Option<Zeroizing<String>>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("server_key", &"[REDACTED]")
            .field("client_key", &self.client_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl Credentials {
    /// Create credentials from a server key.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingServerKey`] if the key is empty or blank.
    pub fn new(server_key: impl Into<String>) -> Result<Self, ConfigError> {
        let server_key = Zeroizing::new(server_key.into());
        if server_key.trim().is_empty() {
            return Err(ConfigError::MissingServerKey);
        }
        Ok(Self {
            server_key,
            client_key: None,
        })
    }

    /// Attach a client key.
    pub fn with_client_key(mut self, client_key: impl Into<String>) -> Self {
        self.client_key = Some(Zeroizing::new(client_key.into()));
        self
    }

    pub fn server_key(&self) -> &str {
        self.server_key.as_str()
    }

    pub fn client_key(&self) -> Option<&str> {
        self.client_key.as_ref().map(|k| k.as_str())
    }

    /// Whether the server key carries the sandbox prefix issued by the dashboard.
    pub fn looks_like_sandbox(&self) -> bool {
        self.server_key.starts_with("SB-")
    }

    /// `Basic base64(server_key + ":")`, marked sensitive.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidServerKey`] if the encoded value is not a
    /// valid header value.
    pub fn authorization_header(&self) -> Result<HeaderValue, ConfigError> {
        let encoded = Zeroizing::new(BASE64_ENGINE.encode(format!("{}:", self.server_key())));
        let mut value = HeaderValue::from_str(&format!("Basic {}", encoded.as_str()))
            .map_err(|_| ConfigError::InvalidServerKey)?;
        value.set_sensitive(true);
        Ok(value)
    }
}
