//! # HTTP Transport Seam
//!
//! The client never talks to the network directly. It hands a fully-built
//! [`TransportRequest`] to a [`Transport`] and gets back the status code and
//! the undecoded body. TLS, connection pooling and timeouts belong to the
//! transport implementation.
//!
//! [`ReqwestTransport`] is the production implementation. Tests and callers
//! with their own HTTP stack provide another implementation behind
//! `Arc<dyn Transport>`.
//!
//! Retries are NOT built into the transport. A single attempt per call.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::Method;
use serde_json::Value;
use url::Url;

/// Errors raised by a [`Transport`] before a usable response exists.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The HTTP request failed (connection, TLS, timeout, body read).
    #[error("HTTP error calling {endpoint}: {source}")]
    Http {
        endpoint: String,
        source: reqwest::Error,
    },
    /// The response body was not valid JSON.
    #[error("failed to decode JSON response from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        source: serde_json::Error,
    },
    /// Failure reported by a non-reqwest transport implementation.
    #[error("transport unavailable for {endpoint}: {reason}")]
    Unavailable { endpoint: String, reason: String },
}

impl TransportError {
    /// Whether the underlying failure was a timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Http { source, .. } if source.is_timeout())
    }
}

/// Per-call transport overrides, passed through untouched by the client.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Request timeout. `None` leaves the transport default in place.
    pub timeout: Option<Duration>,
    /// Extra headers appended after the client's own headers.
    pub headers: HeaderMap,
}

impl RequestOptions {
    /// Layer `overrides` on top of `self`: a set timeout wins, headers are merged
    /// with `overrides` replacing same-named entries.
    pub fn merged(&self, overrides: &RequestOptions) -> RequestOptions {
        let mut headers = self.headers.clone();
        for name in overrides.headers.keys() {
            headers.remove(name);
            for value in overrides.headers.get_all(name) {
                headers.append(name.clone(), value.clone());
            }
        }
        RequestOptions {
            timeout: overrides.timeout.or(self.timeout),
            headers,
        }
    }
}

/// A request ready to be sent.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<Value>,
    pub options: RequestOptions,
}

impl TransportRequest {
    /// `"{METHOD} {path}"`, used as the endpoint label in errors and logs.
    pub fn endpoint(&self) -> String {
        format!("{} {}", self.method, self.url.path())
    }
}

/// Status code and raw body of a completed HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Decode the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Decode`] if the body is not valid JSON.
    pub fn json(&self, endpoint: &str) -> Result<Value, TransportError> {
        serde_json::from_str(&self.body).map_err(|e| TransportError::Decode {
            endpoint: endpoint.to_string(),
            source: e,
        })
    }
}

/// Executes HTTP requests on behalf of the client.
///
/// Implementations must be `Send + Sync` so one instance can serve any
/// number of concurrent calls behind an `Arc`.
#[async_trait]
pub trait Transport: Send + Sync + std::fmt::Debug {
    async fn execute(&self, request: TransportRequest) -> Result<TransportResponse, TransportError>;
}

/// [`Transport`] backed by a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    http: reqwest::Client,
}

impl ReqwestTransport {
    /// Build a transport with a default request timeout.
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { http })
    }

    /// Wrap an already configured `reqwest::Client`.
    pub fn from_client(http: reqwest::Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        let endpoint = request.endpoint();
        let TransportRequest {
            method,
            url,
            mut headers,
            body,
            options,
        } = request;

        for (name, value) in options.headers.iter() {
            headers.insert(name.clone(), value.clone());
        }

        let mut builder = self.http.request(method, url).headers(headers);
        if let Some(timeout) = options.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(body) = body.as_ref() {
            builder = builder.json(body);
        }

        let resp = builder.send().await.map_err(|e| TransportError::Http {
            endpoint: endpoint.clone(),
            source: e,
        })?;

        let status = resp.status().as_u16();
        let body = resp
            .text()
            .await
            .map_err(|e| TransportError::Http { endpoint, source: e })?;

        Ok(TransportResponse { status, body })
    }
}
