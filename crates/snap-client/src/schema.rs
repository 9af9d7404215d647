//! Response schemas.
//!
//! Each response kind is described by a small JSON Schema listing its
//! required non-empty string fields. The schemas are open: unknown
//! properties are allowed and survive in the output's raw payload.
//! Validators are compiled once when the output factory is built.

use serde_json::{json, Value};

use crate::config::ConfigError;
use crate::error::FieldViolation;

/// Pseudo field name used when the body itself has the wrong shape.
pub const ROOT_FIELD: &str = "<root>";

/// Fields required in a successful `POST /snap/v1/transactions` response.
pub const SNAP_TRANSACTION_FIELDS: &[&str] = &["token", "redirect_url"];

/// Fields required in a status or cancel response.
pub const TRANSACTION_STATUS_FIELDS: &[&str] = &["order_id", "transaction_status"];

/// A compiled response schema.
pub struct ResponseSchema {
    kind: &'static str,
    validator: jsonschema::Validator,
}

impl std::fmt::Debug for ResponseSchema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseSchema")
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

impl ResponseSchema {
    /// Compile a schema requiring each of `fields` to be a non-empty string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Schema`] if the generated schema fails to compile.
    pub fn required_strings(kind: &'static str, fields: &[&str]) -> Result<Self, ConfigError> {
        let schema = required_strings_schema(fields);
        let validator = jsonschema::options()
            .with_draft(jsonschema::Draft::Draft202012)
            .build(&schema)
            .map_err(|e| ConfigError::Schema {
                kind,
                reason: e.to_string(),
            })?;
        Ok(Self { kind, validator })
    }

    pub fn kind(&self) -> &'static str {
        self.kind
    }

    /// Validate `value`, collecting every violation.
    pub fn validate(&self, value: &Value) -> Result<(), Vec<FieldViolation>> {
        let violations: Vec<FieldViolation> = self
            .validator
            .iter_errors(value)
            .map(|err| {
                let field = match &err.kind {
                    jsonschema::error::ValidationErrorKind::Required { property } => property
                        .as_str()
                        .map(str::to_string)
                        .unwrap_or_else(|| property.to_string()),
                    _ => top_level_field(&err.instance_path.to_string()),
                };
                FieldViolation {
                    field,
                    message: err.to_string(),
                }
            })
            .collect();

        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }
}

fn required_strings_schema(fields: &[&str]) -> Value {
    let properties: serde_json::Map<String, Value> = fields
        .iter()
        .map(|f| (f.to_string(), json!({ "type": "string", "minLength": 1 })))
        .collect();
    json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "type": "object",
        "required": fields,
        "properties": properties,
        "additionalProperties": true,
    })
}

/// First segment of a JSON Pointer, or [`ROOT_FIELD`] for the empty pointer.
fn top_level_field(pointer: &str) -> String {
    pointer
        .trim_start_matches('/')
        .split('/')
        .next()
        .filter(|s| !s.is_empty())
        .map(|s| s.replace("~1", "/").replace("~0", "~"))
        .unwrap_or_else(|| ROOT_FIELD.to_string())
}
