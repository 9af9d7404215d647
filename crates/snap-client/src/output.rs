//! # Output Decoder
//!
//! Validates decoded gateway responses against the per-kind schemas in
//! [`crate::schema`] and builds typed outputs. Every output keeps the full
//! response object in `raw`, so fields this client does not model are never
//! lost.
//!
//! Slots an instrument cannot fill in the Snap flow are explicit `None` and
//! serialize as `null`; they are never omitted.

use std::sync::Arc;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::ConfigError;
use crate::error::SnapError;
use crate::schema::{ResponseSchema, SNAP_TRANSACTION_FIELDS, TRANSACTION_STATUS_FIELDS};

/// Channel tag carried by every output created through Snap.
pub const SNAP_CHANNEL: &str = "snap";

/// Format of `transaction_time` in Core API responses.
const TRANSACTION_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// -- Outputs ------------------------------------------------------------------

/// Virtual-account transaction created through Snap.
///
/// The customer picks up the VA number on the hosted page; Snap does not
/// return it at creation time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VirtualAccountOutput {
    pub channel: String,
    pub token: String,
    pub redirect_url: String,
    pub bank: Option<String>,
    pub va_number: Option<String>,
    pub expires_at: Option<String>,
    pub raw: Map<String, Value>,
}

/// E-wallet transaction created through Snap.
///
/// Snap serves a single page for all devices, so the checkout, desktop and
/// mobile URLs all carry the redirect URL.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EWalletOutput {
    pub channel: String,
    pub token: String,
    pub redirect_url: String,
    pub checkout_url: String,
    pub desktop_url: String,
    pub mobile_url: String,
    pub deeplink_url: Option<String>,
    pub qr_code_url: Option<String>,
    pub reference_id: Option<String>,
    pub raw: Map<String, Value>,
}

/// Convenience-store transaction created through Snap.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CStoreOutput {
    pub channel: String,
    pub token: String,
    pub redirect_url: String,
    pub store: Option<String>,
    pub payment_code: Option<String>,
    pub expires_at: Option<String>,
    pub raw: Map<String, Value>,
}

/// Output of [`SnapClient::create`](crate::SnapClient::create).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SnapOutput {
    VirtualAccount(VirtualAccountOutput),
    #[serde(rename = "ewallet")]
    EWallet(EWalletOutput),
    #[serde(rename = "cstore")]
    ConvenienceStore(CStoreOutput),
}

impl SnapOutput {
    pub fn token(&self) -> &str {
        match self {
            Self::VirtualAccount(o) => &o.token,
            Self::EWallet(o) => &o.token,
            Self::ConvenienceStore(o) => &o.token,
        }
    }

    pub fn redirect_url(&self) -> &str {
        match self {
            Self::VirtualAccount(o) => &o.redirect_url,
            Self::EWallet(o) => &o.redirect_url,
            Self::ConvenienceStore(o) => &o.redirect_url,
        }
    }

    pub fn raw(&self) -> &Map<String, Value> {
        match self {
            Self::VirtualAccount(o) => &o.raw,
            Self::EWallet(o) => &o.raw,
            Self::ConvenienceStore(o) => &o.raw,
        }
    }
}

/// Transaction status as reported by the Core API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Pending,
    Authorize,
    Capture,
    Settlement,
    Deny,
    Cancel,
    Expire,
    Failure,
    Refund,
    PartialRefund,
    Chargeback,
    PartialChargeback,
    /// Forward-compatible catch-all for statuses added after this release.
    #[serde(other)]
    Unknown,
}

impl TransactionStatus {
    /// Whether the gateway will not move this transaction any further.
    pub fn is_final(&self) -> bool {
        !matches!(self, Self::Pending | Self::Authorize | Self::Unknown)
    }
}

/// Result of a status lookup or cancellation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckStatusOutput {
    pub order_id: String,
    pub status: TransactionStatus,
    pub transaction_id: Option<String>,
    pub status_code: Option<String>,
    pub status_message: Option<String>,
    pub payment_type: Option<String>,
    pub gross_amount: Option<String>,
    pub fraud_status: Option<String>,
    pub transaction_time: Option<NaiveDateTime>,
    pub raw: Map<String, Value>,
}

// -- Factory ------------------------------------------------------------------

/// Validates and decodes gateway responses.
///
/// Cheap to clone: compiled schemas are shared behind `Arc`.
#[derive(Debug, Clone)]
pub struct SnapOutputFactory {
    transaction: Arc<ResponseSchema>,
    status: Arc<ResponseSchema>,
}

impl SnapOutputFactory {
    /// Compile the response schemas.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Schema`] if a schema fails to compile.
    pub fn new() -> Result<Self, ConfigError> {
        Ok(Self {
            transaction: Arc::new(ResponseSchema::required_strings(
                "snap_transaction",
                SNAP_TRANSACTION_FIELDS,
            )?),
            status: Arc::new(ResponseSchema::required_strings(
                "transaction_status",
                TRANSACTION_STATUS_FIELDS,
            )?),
        })
    }

    pub fn virtual_account_output(
        &self,
        endpoint: &str,
        data: &Value,
    ) -> Result<VirtualAccountOutput, SnapError> {
        let (raw, token, redirect_url) = self.snap_fields(endpoint, data)?;
        Ok(VirtualAccountOutput {
            channel: SNAP_CHANNEL.to_string(),
            token,
            redirect_url,
            bank: None,
            va_number: None,
            expires_at: None,
            raw,
        })
    }

    pub fn ewallet_output(&self, endpoint: &str, data: &Value) -> Result<EWalletOutput, SnapError> {
        let (raw, token, redirect_url) = self.snap_fields(endpoint, data)?;
        Ok(EWalletOutput {
            channel: SNAP_CHANNEL.to_string(),
            token,
            checkout_url: redirect_url.clone(),
            desktop_url: redirect_url.clone(),
            mobile_url: redirect_url.clone(),
            redirect_url,
            deeplink_url: None,
            qr_code_url: None,
            reference_id: None,
            raw,
        })
    }

    pub fn cstore_output(&self, endpoint: &str, data: &Value) -> Result<CStoreOutput, SnapError> {
        let (raw, token, redirect_url) = self.snap_fields(endpoint, data)?;
        Ok(CStoreOutput {
            channel: SNAP_CHANNEL.to_string(),
            token,
            redirect_url,
            store: None,
            payment_code: None,
            expires_at: None,
            raw,
        })
    }

    pub fn check_status_output(
        &self,
        endpoint: &str,
        data: &Value,
    ) -> Result<CheckStatusOutput, SnapError> {
        let raw = validated_object(&self.status, endpoint, data)?;
        let status = serde_json::from_value(Value::String(required_str(&raw, "transaction_status")))
            .unwrap_or(TransactionStatus::Unknown);

        Ok(CheckStatusOutput {
            order_id: required_str(&raw, "order_id"),
            status,
            transaction_id: optional_str(&raw, "transaction_id"),
            status_code: optional_str(&raw, "status_code"),
            status_message: optional_str(&raw, "status_message"),
            payment_type: optional_str(&raw, "payment_type"),
            gross_amount: optional_str(&raw, "gross_amount"),
            fraud_status: optional_str(&raw, "fraud_status"),
            transaction_time: optional_str(&raw, "transaction_time")
                .and_then(|t| NaiveDateTime::parse_from_str(&t, TRANSACTION_TIME_FORMAT).ok()),
            raw,
        })
    }

    /// Validate a Snap creation response and pull out its required fields.
    fn snap_fields(
        &self,
        endpoint: &str,
        data: &Value,
    ) -> Result<(Map<String, Value>, String, String), SnapError> {
        let raw = validated_object(&self.transaction, endpoint, data)?;
        let token = required_str(&raw, "token");
        let redirect_url = required_str(&raw, "redirect_url");
        Ok((raw, token, redirect_url))
    }
}

fn validated_object(
    schema: &ResponseSchema,
    endpoint: &str,
    data: &Value,
) -> Result<Map<String, Value>, SnapError> {
    if let Err(violations) = schema.validate(data) {
        tracing::warn!(
            endpoint,
            schema = schema.kind(),
            violations = violations.len(),
            "gateway response failed schema validation"
        );
        return Err(SnapError::MalformedResponse {
            endpoint: endpoint.to_string(),
            violations,
            raw: data.clone(),
        });
    }
    // The schema requires an object, so this only falls through on a schema bug.
    match data {
        Value::Object(map) => Ok(map.clone()),
        other => Err(SnapError::MalformedResponse {
            endpoint: endpoint.to_string(),
            violations: vec![crate::error::FieldViolation {
                field: crate::schema::ROOT_FIELD.to_string(),
                message: "expected a JSON object".to_string(),
            }],
            raw: other.clone(),
        }),
    }
}

/// A field the schema already guaranteed to be a non-empty string.
fn required_str(map: &Map<String, Value>, key: &str) -> String {
    map.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Strings are taken as-is, numbers are rendered (some gateways send amounts as numbers).
fn optional_str(map: &Map<String, Value>, key: &str) -> Option<String> {
    match map.get(key)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
