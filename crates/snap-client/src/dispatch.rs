//! Request plumbing shared by [`SnapClient`](crate::SnapClient) and
//! [`CoreApiClient`](crate::CoreApiClient).
//!
//! Both clients are built from the same [`ClientParts`]: configuration,
//! factories, transport, and the headers derived from the credentials. The
//! parts are immutable and cheap to clone, which is what lets the
//! orchestrator build a fresh sub-client on every status/cancel call.

use std::sync::Arc;

use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::Method;
use serde_json::Value;
use url::Url;

use crate::config::{ConfigError, SnapConfig};
use crate::error::SnapError;
use crate::normalize::SnapInputFactory;
use crate::output::SnapOutputFactory;
use crate::transport::{RequestOptions, Transport, TransportError, TransportRequest, TransportResponse};

/// Everything a client needs to issue requests.
#[derive(Debug, Clone)]
pub(crate) struct ClientParts {
    pub(crate) config: Arc<SnapConfig>,
    pub(crate) inputs: SnapInputFactory,
    pub(crate) outputs: SnapOutputFactory,
    pub(crate) transport: Arc<dyn Transport>,
    headers: HeaderMap,
    options: RequestOptions,
}

impl ClientParts {
    pub(crate) fn new(
        config: SnapConfig,
        inputs: SnapInputFactory,
        outputs: SnapOutputFactory,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, ConfigError> {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, config.credentials.authorization_header()?);
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let options = config.defaults.clone();

        Ok(Self {
            config: Arc::new(config),
            inputs,
            outputs,
            transport,
            headers,
            options,
        })
    }

    /// Same parts with `overrides` layered over the current options.
    pub(crate) fn with_options(&self, overrides: &RequestOptions) -> Self {
        let mut parts = self.clone();
        parts.options = self.options.merged(overrides);
        parts
    }

    pub(crate) fn options(&self) -> &RequestOptions {
        &self.options
    }

    /// Send one request. No retries.
    pub(crate) async fn send(
        &self,
        method: Method,
        url: Url,
        body: Option<Value>,
    ) -> Result<TransportResponse, SnapError> {
        let request = TransportRequest {
            method,
            url,
            headers: self.headers.clone(),
            body,
            options: self.options.clone(),
        };
        let endpoint = request.endpoint();
        tracing::debug!(
            endpoint = %endpoint,
            environment = %self.config.environment,
            "dispatching gateway request"
        );

        let response = self.transport.execute(request).await.map_err(|e| {
            tracing::warn!(endpoint = %endpoint, error = %e, "gateway transport failed");
            SnapError::Transport(e)
        })?;

        tracing::debug!(endpoint = %endpoint, status = response.status, "gateway responded");
        Ok(response)
    }
}

/// Append `segments` to `base`, percent-encoding each one.
pub(crate) fn endpoint_url(base: &Url, segments: &[&str]) -> Result<Url, SnapError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| {
            SnapError::Transport(TransportError::Unavailable {
                endpoint: base.to_string(),
                reason: "base URL cannot carry a path".to_string(),
            })
        })?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Accept only `expected`, then decode the body as JSON.
///
/// Any other status is [`SnapError::GatewayRejected`] with the body left
/// undecoded.
pub(crate) fn expect_status(
    endpoint: &str,
    response: &TransportResponse,
    expected: u16,
) -> Result<Value, SnapError> {
    if response.status != expected {
        tracing::warn!(
            endpoint,
            status = response.status,
            expected,
            "gateway rejected request"
        );
        return Err(SnapError::GatewayRejected {
            endpoint: endpoint.to_string(),
            status: response.status,
            body: response.body.clone(),
        });
    }
    Ok(response.json(endpoint)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_url_encodes_segments_and_keeps_prefix() {
        let base = Url::parse("https://proxy.example/midtrans/").unwrap();
        let url = endpoint_url(&base, &["v2", "INV 1/2", "status"]).unwrap();
        assert_eq!(url.as_str(), "https://proxy.example/midtrans/v2/INV%201%2F2/status");

        let origin = Url::parse("https://api.sandbox.midtrans.com").unwrap();
        let url = endpoint_url(&origin, &["snap", "v1", "transactions"]).unwrap();
        assert_eq!(url.as_str(), "https://api.sandbox.midtrans.com/snap/v1/transactions");
    }

    #[test]
    fn non_success_status_is_rejected_without_decoding() {
        let resp = TransportResponse::new(400, "not json at all");
        let err = expect_status("POST /snap/v1/transactions", &resp, 201).unwrap_err();
        match err {
            SnapError::GatewayRejected { status, body, .. } => {
                assert_eq!(status, 400);
                assert_eq!(body, "not json at all");
            }
            other => panic!("expected GatewayRejected, got: {other:?}"),
        }
    }

    #[test]
    fn success_status_with_invalid_json_is_transport_failure() {
        let resp = TransportResponse::new(201, "{ broken");
        let err = expect_status("POST /snap/v1/transactions", &resp, 201).unwrap_err();
        assert!(matches!(err, SnapError::Transport(TransportError::Decode { .. })));
    }

    #[test]
    fn success_status_decodes_body() {
        let resp = TransportResponse::new(201, r#"{"token":"abc"}"#);
        let value = expect_status("POST /snap/v1/transactions", &resp, 201).unwrap();
        assert_eq!(value["token"], "abc");
    }
}
