//! Core API client for transaction status and cancellation.
//!
//! Base URL: `api.sandbox.midtrans.com` / `api.midtrans.com`
//!
//! Besides the HTTP status, these endpoints report some failures inside a
//! `200 OK` body through a string `status_code` (for example `"404"` for an
//! unknown order or `"412"` for a transaction that can no longer be
//! cancelled). Such bodies are rejections, not status documents. `"407"` is
//! the exception: it is how the gateway reports an expired transaction.

use std::sync::Arc;

use reqwest::Method;
use serde_json::Value;
use url::Url;

use crate::config::{ConfigError, SnapConfig};
use crate::dispatch::{endpoint_url, expect_status, ClientParts};
use crate::error::SnapError;
use crate::input::{CancelInput, CheckStatusInput, OrderId};
use crate::normalize::SnapInputFactory;
use crate::output::{CheckStatusOutput, SnapOutputFactory};
use crate::transport::Transport;

/// HTTP status of a successful status or cancel call.
const OK: u16 = 200;

/// Embedded `status_code` of an expired transaction's status document.
const EXPIRED_STATUS_CODE: u16 = 407;

/// Narrow client knowing only the status and cancel contracts.
#[derive(Debug, Clone)]
pub struct CoreApiClient {
    parts: ClientParts,
}

impl CoreApiClient {
    /// Create a standalone Core API client.
    pub fn new(config: SnapConfig, transport: Arc<dyn Transport>) -> Result<Self, ConfigError> {
        Ok(Self::from_parts(ClientParts::new(
            config,
            SnapInputFactory::new(),
            SnapOutputFactory::new()?,
            transport,
        )?))
    }

    pub(crate) fn from_parts(parts: ClientParts) -> Self {
        Self { parts }
    }

    /// Base URL status and cancel requests are sent to.
    pub fn base_url(&self) -> &Url {
        &self.parts.config.endpoints.core_api
    }

    /// `GET {base}/v2/{order_id}/status`.
    pub async fn status(&self, input: &CheckStatusInput) -> Result<CheckStatusOutput, SnapError> {
        self.call(Method::GET, &input.order_id, "status").await
    }

    /// `POST {base}/v2/{order_id}/cancel`.
    pub async fn cancel(&self, input: &CancelInput) -> Result<CheckStatusOutput, SnapError> {
        tracing::info!(order_id = %input.order_id, "cancelling transaction");
        self.call(Method::POST, &input.order_id, "cancel").await
    }

    async fn call(
        &self,
        method: Method,
        order_id: &OrderId,
        action: &str,
    ) -> Result<CheckStatusOutput, SnapError> {
        let endpoint = format!("{method} /v2/{order_id}/{action}");
        let url = endpoint_url(self.base_url(), &["v2", order_id.as_str(), action])?;
        let response = self.parts.send(method, url, None).await?;
        let data = expect_status(&endpoint, &response, OK)?;

        if let Some(code) = embedded_rejection(&data) {
            tracing::warn!(endpoint = %endpoint, status_code = code, "gateway rejected request in body");
            return Err(SnapError::GatewayRejected {
                endpoint,
                status: code,
                body: response.body,
            });
        }

        self.parts.outputs.check_status_output(&endpoint, &data)
    }
}

/// A failure `status_code` reported inside a 200 body.
fn embedded_rejection(data: &Value) -> Option<u16> {
    let code: u16 = data.get("status_code")?.as_str()?.trim().parse().ok()?;
    (code >= 400 && code != EXPIRED_STATUS_CODE).then_some(code)
}
