//! Snap client error types.
//!
//! Every public operation fails with exactly one [`SnapError`] variant:
//!
//! | Variant | Meaning |
//! |---------|---------|
//! | `GatewayRejected` | The gateway answered with a status other than the endpoint's success code. |
//! | `MalformedResponse` | The success status arrived but the body broke the response schema. |
//! | `Transport` | No usable response: network/TLS/timeout failure or a body that is not JSON. |
//!
//! None of these are retried by the client.

use serde_json::Value;

use crate::transport::TransportError;

/// A single schema violation found in a gateway response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    /// Top-level field name, or `<root>` when the body itself has the wrong shape.
    pub field: String,
    /// Human-readable description from the schema validator.
    pub message: String,
}

impl std::fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Errors from Snap and Core API calls.
#[derive(Debug, thiserror::Error)]
pub enum SnapError {
    /// The gateway returned a non-success status. The body is kept undecoded.
    #[error("{endpoint} rejected with status {status}: {body}")]
    GatewayRejected {
        endpoint: String,
        status: u16,
        body: String,
    },
    /// The gateway returned the success status with a body that failed validation.
    #[error("malformed response from {endpoint}: invalid field(s) {}", field_list(.violations))]
    MalformedResponse {
        endpoint: String,
        violations: Vec<FieldViolation>,
        raw: Value,
    },
    /// The transport failed before a decodable response was obtained.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl SnapError {
    /// Names of the fields that failed validation, empty for other variants.
    pub fn invalid_fields(&self) -> Vec<&str> {
        match self {
            Self::MalformedResponse { violations, .. } => {
                violations.iter().map(|v| v.field.as_str()).collect()
            }
            _ => Vec::new(),
        }
    }

    /// HTTP (or gateway-embedded) status code for rejections.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::GatewayRejected { status, .. } => Some(*status),
            _ => None,
        }
    }
}

fn field_list(violations: &[FieldViolation]) -> String {
    let mut fields: Vec<&str> = violations.iter().map(|v| v.field.as_str()).collect();
    fields.dedup();
    fields.join(", ")
}
