//! # Snap Client
//!
//! Orchestrates transaction creation against Snap and delegates status and
//! cancel calls to a [`CoreApiClient`] built from the same parts.
//!
//! | Method | Path | Operation | Success |
//! |--------|------|-----------|---------|
//! | POST | `/snap/v1/transactions` | `create_*` | 201 |
//! | GET  | `/v2/{order_id}/status` | `status` | 200 |
//! | POST | `/v2/{order_id}/cancel` | `cancel` | 200 |
//!
//! Every call makes exactly one transport request. There is no retry, no
//! backoff and no caching; retry policy belongs to the caller.

use std::sync::Arc;

use reqwest::Method;
use url::Url;

use crate::config::{ConfigError, Environment, SnapConfig};
use crate::core_api::CoreApiClient;
use crate::dispatch::{endpoint_url, expect_status, ClientParts};
use crate::error::SnapError;
use crate::input::{
    CStoreTransactionInput, CancelInput, CheckStatusInput, EWalletTransactionInput, OrderId,
    TransactionInput, VirtualAccountTransactionInput,
};
use crate::normalize::{RequestBody, SnapInputFactory};
use crate::output::{
    CStoreOutput, CheckStatusOutput, EWalletOutput, SnapOutput, SnapOutputFactory,
    VirtualAccountOutput,
};
use crate::transport::{ReqwestTransport, RequestOptions, Transport};

/// Endpoint label for transaction creation.
pub const CREATE_TRANSACTION_ENDPOINT: &str = "POST /snap/v1/transactions";

/// The only status code Snap returns for a created transaction.
const CREATED: u16 = 201;

/// Typed client for Snap transaction creation, status and cancel.
///
/// `Clone` is cheap and clones share the transport. Safe to use from any
/// number of tasks at once.
#[derive(Debug, Clone)]
pub struct SnapClient {
    parts: ClientParts,
}

impl SnapClient {
    /// Create a client with the default reqwest transport.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the HTTP client cannot be built, the server
    /// key is not a valid header value, or a response schema fails to compile.
    pub fn new(config: SnapConfig) -> Result<Self, ConfigError> {
        let transport = ReqwestTransport::new(config.timeout())?;
        Self::with_transport(config, Arc::new(transport))
    }

    /// Create a client over a caller-supplied transport.
    pub fn with_transport(
        config: SnapConfig,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, ConfigError> {
        Self::from_parts(
            config,
            SnapInputFactory::new(),
            SnapOutputFactory::new()?,
            transport,
        )
    }

    /// Create a client from explicit factories and transport.
    pub fn from_parts(
        config: SnapConfig,
        inputs: SnapInputFactory,
        outputs: SnapOutputFactory,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            parts: ClientParts::new(config, inputs, outputs, transport)?,
        })
    }

    /// A copy of this client whose requests carry `overrides` (timeout,
    /// extra headers) on top of the configured defaults.
    pub fn with_options(&self, overrides: &RequestOptions) -> Self {
        Self {
            parts: self.parts.with_options(overrides),
        }
    }

    pub fn config(&self) -> &SnapConfig {
        &self.parts.config
    }

    pub fn environment(&self) -> Environment {
        self.parts.config.environment
    }

    pub fn options(&self) -> &RequestOptions {
        self.parts.options()
    }

    pub fn input_factory(&self) -> &SnapInputFactory {
        &self.parts.inputs
    }

    pub fn output_factory(&self) -> &SnapOutputFactory {
        &self.parts.outputs
    }

    /// Create a bank-transfer transaction paid into a virtual account.
    pub async fn create_virtual_account(
        &self,
        input: &VirtualAccountTransactionInput,
    ) -> Result<VirtualAccountOutput, SnapError> {
        let body = self.parts.inputs.virtual_account_body(input);
        let data = self.create_transaction(input.order_id(), body).await?;
        self.parts
            .outputs
            .virtual_account_output(CREATE_TRANSACTION_ENDPOINT, &data)
    }

    /// Create an e-wallet transaction.
    pub async fn create_ewallet(
        &self,
        input: &EWalletTransactionInput,
    ) -> Result<EWalletOutput, SnapError> {
        let body = self.parts.inputs.ewallet_body(input);
        let data = self.create_transaction(input.order_id(), body).await?;
        self.parts
            .outputs
            .ewallet_output(CREATE_TRANSACTION_ENDPOINT, &data)
    }

    /// Create a convenience-store transaction.
    pub async fn create_convenience_store(
        &self,
        input: &CStoreTransactionInput,
    ) -> Result<CStoreOutput, SnapError> {
        let body = self.parts.inputs.cstore_body(input);
        let data = self.create_transaction(input.order_id(), body).await?;
        self.parts
            .outputs
            .cstore_output(CREATE_TRANSACTION_ENDPOINT, &data)
    }

    /// Create a transaction of whatever kind `input` is.
    pub async fn create(&self, input: &TransactionInput) -> Result<SnapOutput, SnapError> {
        match input {
            TransactionInput::VirtualAccount(i) => {
                self.create_virtual_account(i).await.map(SnapOutput::VirtualAccount)
            }
            TransactionInput::EWallet(i) => self.create_ewallet(i).await.map(SnapOutput::EWallet),
            TransactionInput::ConvenienceStore(i) => self
                .create_convenience_store(i)
                .await
                .map(SnapOutput::ConvenienceStore),
        }
    }

    /// Look up a transaction through the Core API.
    pub async fn status(&self, input: &CheckStatusInput) -> Result<CheckStatusOutput, SnapError> {
        self.core_api().status(input).await
    }

    /// Cancel a transaction through the Core API.
    pub async fn cancel(&self, input: &CancelInput) -> Result<CheckStatusOutput, SnapError> {
        self.core_api().cancel(input).await
    }

    /// Build the status/cancel client from this client's parts.
    pub fn core_api(&self) -> CoreApiClient {
        CoreApiClient::from_parts(self.parts.clone())
    }

    /// Base URL transaction creation is sent to.
    pub fn base_url(&self) -> &Url {
        &self.parts.config.endpoints.snap
    }

    async fn create_transaction(
        &self,
        order_id: &OrderId,
        body: RequestBody,
    ) -> Result<serde_json::Value, SnapError> {
        tracing::info!(order_id = %order_id, "creating Snap transaction");
        let url = endpoint_url(self.base_url(), &["snap", "v1", "transactions"])?;
        let response = self
            .parts
            .send(Method::POST, url, Some(body.into_value()))
            .await?;
        expect_status(CREATE_TRANSACTION_ENDPOINT, &response, CREATED)
    }
}
