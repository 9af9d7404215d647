//! # Input Normalizer
//!
//! Turns each creation input into the single request body shape accepted by
//! `POST /snap/v1/transactions`:
//!
//! ```json
//! {
//!   "transaction_details": { "order_id": "INV-1", "gross_amount": 150000 },
//!   "enabled_payments": ["bca_va"],
//!   "bca_va": { "va_number": "12345678" },
//!   "customer_details": { "first_name": "Budi", "email": "budi@example.com" },
//!   "expiry": { "start_time": "2026-10-16 10:00:00 +0700", "unit": "hour", "duration": 24 },
//!   "metadata": { "cart": "c-77" }
//! }
//! ```
//!
//! Only `transaction_details` and `enabled_payments` are always present. The
//! nested payment object and the optional sections appear only when they
//! carry data; nothing is ever sent as an empty placeholder.

use serde_json::{json, Map, Value};

use crate::input::{
    CStoreTransactionInput, EWalletProvider, EWalletTransactionInput, TransactionCommon,
    TransactionInput, VirtualAccountTransactionInput,
};

/// Canonical request body for transaction creation.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestBody(Map<String, Value>);

impl RequestBody {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

/// Stateless normalizer for creation inputs.
#[derive(Debug, Clone, Copy, Default)]
pub struct SnapInputFactory;

impl SnapInputFactory {
    pub fn new() -> Self {
        Self
    }

    /// Normalize any creation input.
    pub fn normalize(&self, input: &TransactionInput) -> RequestBody {
        match input {
            TransactionInput::VirtualAccount(i) => self.virtual_account_body(i),
            TransactionInput::EWallet(i) => self.ewallet_body(i),
            TransactionInput::ConvenienceStore(i) => self.cstore_body(i),
        }
    }

    pub fn virtual_account_body(&self, input: &VirtualAccountTransactionInput) -> RequestBody {
        let code = input.bank().payment_code();
        let mut body = base_body(input.common(), code);
        if let Some(va_number) = input.va_number() {
            body.insert(code.to_string(), json!({ "va_number": va_number }));
        }
        RequestBody(body)
    }

    pub fn ewallet_body(&self, input: &EWalletTransactionInput) -> RequestBody {
        let code = input.provider().payment_code();
        let mut body = base_body(input.common(), code);
        if let Some(url) = input.callback_url() {
            let nested = match input.provider() {
                EWalletProvider::Gopay => json!({
                    "enable_callback": true,
                    "callback_url": url.as_str(),
                }),
                EWalletProvider::Shopeepay => json!({ "callback_url": url.as_str() }),
            };
            body.insert(code.to_string(), nested);
        }
        RequestBody(body)
    }

    pub fn cstore_body(&self, input: &CStoreTransactionInput) -> RequestBody {
        let store = input.store().payment_code();
        let mut body = base_body(input.common(), store);
        let mut cstore = Map::new();
        cstore.insert("store".into(), Value::String(store.to_string()));
        if let Some(message) = input.message() {
            cstore.insert("message".into(), Value::String(message.to_string()));
        }
        body.insert("cstore".into(), Value::Object(cstore));
        RequestBody(body)
    }
}

/// Sections common to every kind.
fn base_body(common: &TransactionCommon, payment_code: &str) -> Map<String, Value> {
    let details = common.details();
    let mut body = Map::new();
    body.insert(
        "transaction_details".into(),
        json!({
            "order_id": details.order_id.as_str(),
            "gross_amount": details.amount,
        }),
    );
    body.insert("enabled_payments".into(), json!([payment_code]));

    if let Some(customer) = common.customer() {
        let mut section = Map::new();
        for (key, value) in [
            ("first_name", &customer.first_name),
            ("last_name", &customer.last_name),
            ("email", &customer.email),
            ("phone", &customer.phone),
        ] {
            if let Some(v) = value.as_deref().filter(|v| !v.is_empty()) {
                section.insert(key.into(), Value::String(v.to_string()));
            }
        }
        if !section.is_empty() {
            body.insert("customer_details".into(), Value::Object(section));
        }
    }

    if let Some(expiry) = common.expiry() {
        let mut section = Map::new();
        if let Some(start) = expiry.start_time() {
            section.insert(
                "start_time".into(),
                Value::String(start.format("%Y-%m-%d %H:%M:%S %z").to_string()),
            );
        }
        section.insert("unit".into(), Value::String(expiry.unit().as_str().into()));
        section.insert("duration".into(), json!(expiry.duration()));
        body.insert("expiry".into(), Value::Object(section));
    }

    if !common.metadata().is_empty() {
        let metadata: Map<String, Value> = common
            .metadata()
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect();
        body.insert("metadata".into(), Value::Object(metadata));
    }

    body
}
