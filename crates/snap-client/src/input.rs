//! # Transaction Inputs
//!
//! Validated value objects describing what the caller wants to create, look
//! up, or cancel. Every constraint is checked at construction: a value of
//! these types is always normalizable, so the normalizer has no failure
//! modes.
//!
//! ## Order IDs
//!
//! The gateway accepts order ids of at most 50 characters drawn from ASCII
//! alphanumerics and `-`, `_`, `~`, `.`. Order ids must be unique per
//! merchant; uniqueness is the gateway's concern, not ours.

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset};
use url::Url;

/// Maximum order id length accepted by the gateway.
pub const MAX_ORDER_ID_LEN: usize = 50;

/// Errors raised while constructing inputs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    #[error("order id must not be empty")]
    EmptyOrderId,
    #[error("order id is {len} characters long (max {})", MAX_ORDER_ID_LEN)]
    OrderIdTooLong { len: usize },
    #[error("order id {0:?} contains characters outside [A-Za-z0-9-_~.]")]
    InvalidOrderId(String),
    #[error("virtual account number {0:?} must be 1-20 digits")]
    InvalidVaNumber(String),
    #[error("{0} does not accept a custom virtual account number")]
    VaNumberNotSupported(VirtualAccountBank),
    #[error("invalid callback URL {0:?}: {1}")]
    InvalidCallbackUrl(String, String),
    #[error("{0} must not be empty")]
    EmptyField(&'static str),
    #[error("expiry duration must be greater than zero")]
    InvalidExpiryDuration,
    #[error("unknown {kind} {value:?}")]
    UnknownVariant { kind: &'static str, value: String },
}

// -- Identifiers --------------------------------------------------------------

/// Merchant order identifier (or gateway transaction id for lookups).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OrderId(String);

impl OrderId {
    /// Validate and wrap an order id.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::EmptyOrderId`], [`InputError::OrderIdTooLong`] or
    /// [`InputError::InvalidOrderId`].
    pub fn new(value: impl Into<String>) -> Result<Self, InputError> {
        let s = value.into();
        if s.is_empty() {
            return Err(InputError::EmptyOrderId);
        }
        let len = s.chars().count();
        if len > MAX_ORDER_ID_LEN {
            return Err(InputError::OrderIdTooLong { len });
        }
        if !s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '~' | '.'))
        {
            return Err(InputError::InvalidOrderId(s));
        }
        Ok(Self(s))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// -- Instrument enums ---------------------------------------------------------

/// Banks offered as virtual-account destinations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VirtualAccountBank {
    Bca,
    Bni,
    Bri,
    Permata,
    Cimb,
    /// Mandiri bill payment ("echannel").
    Mandiri,
    /// Any other bank via the ATM Bersama / Prima network.
    Other,
}

impl VirtualAccountBank {
    /// Entry for `enabled_payments` and the nested payment object key.
    pub fn payment_code(&self) -> &'static str {
        match self {
            Self::Bca => "bca_va",
            Self::Bni => "bni_va",
            Self::Bri => "bri_va",
            Self::Permata => "permata_va",
            Self::Cimb => "cimb_va",
            Self::Mandiri => "echannel",
            Self::Other => "other_va",
        }
    }

    /// Whether the bank lets the merchant choose the VA number.
    pub fn accepts_custom_va_number(&self) -> bool {
        !matches!(self, Self::Mandiri | Self::Other)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bca => "bca",
            Self::Bni => "bni",
            Self::Bri => "bri",
            Self::Permata => "permata",
            Self::Cimb => "cimb",
            Self::Mandiri => "mandiri",
            Self::Other => "other",
        }
    }
}

impl std::fmt::Display for VirtualAccountBank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for VirtualAccountBank {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bca" => Ok(Self::Bca),
            "bni" => Ok(Self::Bni),
            "bri" => Ok(Self::Bri),
            "permata" => Ok(Self::Permata),
            "cimb" => Ok(Self::Cimb),
            "mandiri" | "echannel" => Ok(Self::Mandiri),
            "other" => Ok(Self::Other),
            _ => Err(InputError::UnknownVariant {
                kind: "bank",
                value: s.to_string(),
            }),
        }
    }
}

/// E-wallet providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EWalletProvider {
    Gopay,
    Shopeepay,
}

impl EWalletProvider {
    pub fn payment_code(&self) -> &'static str {
        match self {
            Self::Gopay => "gopay",
            Self::Shopeepay => "shopeepay",
        }
    }
}

impl std::fmt::Display for EWalletProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.payment_code())
    }
}

impl std::str::FromStr for EWalletProvider {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "gopay" => Ok(Self::Gopay),
            "shopeepay" => Ok(Self::Shopeepay),
            _ => Err(InputError::UnknownVariant {
                kind: "e-wallet provider",
                value: s.to_string(),
            }),
        }
    }
}

/// Convenience-store chains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConvenienceStore {
    Indomaret,
    Alfamart,
}

impl ConvenienceStore {
    pub fn payment_code(&self) -> &'static str {
        match self {
            Self::Indomaret => "indomaret",
            Self::Alfamart => "alfamart",
        }
    }
}

impl std::fmt::Display for ConvenienceStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.payment_code())
    }
}

impl std::str::FromStr for ConvenienceStore {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "indomaret" => Ok(Self::Indomaret),
            "alfamart" => Ok(Self::Alfamart),
            _ => Err(InputError::UnknownVariant {
                kind: "convenience store",
                value: s.to_string(),
            }),
        }
    }
}

// -- Shared parts -------------------------------------------------------------

/// Order id and gross amount in the smallest currency unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionDetails {
    pub order_id: OrderId,
    pub amount: u64,
}

/// Optional customer contact details. Unset fields are not sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomerDetails {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl CustomerDetails {
    pub fn is_empty(&self) -> bool {
        [&self.first_name, &self.last_name, &self.email, &self.phone]
            .iter()
            .all(|f| f.as_deref().map_or(true, str::is_empty))
    }
}

/// Unit of an [`Expiry`] duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpiryUnit {
    Second,
    Minute,
    Hour,
    Day,
}

impl ExpiryUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Second => "second",
            Self::Minute => "minute",
            Self::Hour => "hour",
            Self::Day => "day",
        }
    }
}

impl std::str::FromStr for ExpiryUnit {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().trim_end_matches('s') {
            "second" => Ok(Self::Second),
            "minute" => Ok(Self::Minute),
            "hour" => Ok(Self::Hour),
            "day" => Ok(Self::Day),
            _ => Err(InputError::UnknownVariant {
                kind: "expiry unit",
                value: s.to_string(),
            }),
        }
    }
}

/// Payment deadline. Without a start time the gateway counts from creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expiry {
    start_time: Option<DateTime<FixedOffset>>,
    duration: u32,
    unit: ExpiryUnit,
}

impl Expiry {
    /// # Errors
    ///
    /// Returns [`InputError::InvalidExpiryDuration`] if `duration` is zero.
    pub fn new(duration: u32, unit: ExpiryUnit) -> Result<Self, InputError> {
        if duration == 0 {
            return Err(InputError::InvalidExpiryDuration);
        }
        Ok(Self {
            start_time: None,
            duration,
            unit,
        })
    }

    pub fn starting_at(mut self, start_time: DateTime<FixedOffset>) -> Self {
        self.start_time = Some(start_time);
        self
    }

    pub fn start_time(&self) -> Option<&DateTime<FixedOffset>> {
        self.start_time.as_ref()
    }

    pub fn duration(&self) -> u32 {
        self.duration
    }

    pub fn unit(&self) -> ExpiryUnit {
        self.unit
    }
}

/// Fields shared by every transaction kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionCommon {
    details: TransactionDetails,
    customer: Option<CustomerDetails>,
    expiry: Option<Expiry>,
    metadata: BTreeMap<String, String>,
}

impl TransactionCommon {
    fn new(order_id: impl Into<String>, amount: u64) -> Result<Self, InputError> {
        Ok(Self {
            details: TransactionDetails {
                order_id: OrderId::new(order_id)?,
                amount,
            },
            customer: None,
            expiry: None,
            metadata: BTreeMap::new(),
        })
    }

    pub fn details(&self) -> &TransactionDetails {
        &self.details
    }

    pub fn customer(&self) -> Option<&CustomerDetails> {
        self.customer.as_ref()
    }

    pub fn expiry(&self) -> Option<&Expiry> {
        self.expiry.as_ref()
    }

    pub fn metadata(&self) -> &BTreeMap<String, String> {
        &self.metadata
    }
}

/// Builder methods and accessors shared by the three creation inputs.
macro_rules! impl_transaction_common {
    ($ty:ty) => {
        impl $ty {
            /// Attach customer details. Empty details are dropped.
            pub fn with_customer(mut self, customer: CustomerDetails) -> Self {
                self.common.customer = (!customer.is_empty()).then_some(customer);
                self
            }

            pub fn with_expiry(mut self, expiry: Expiry) -> Self {
                self.common.expiry = Some(expiry);
                self
            }

            /// Add a metadata entry.
            ///
            /// # Errors
            ///
            /// Returns [`InputError::EmptyField`] if the key is empty.
            pub fn with_metadata(
                mut self,
                key: impl Into<String>,
                value: impl Into<String>,
            ) -> Result<Self, InputError> {
                let key = key.into();
                if key.is_empty() {
                    return Err(InputError::EmptyField("metadata key"));
                }
                self.common.metadata.insert(key, value.into());
                Ok(self)
            }

            pub fn common(&self) -> &TransactionCommon {
                &self.common
            }

            pub fn order_id(&self) -> &OrderId {
                &self.common.details.order_id
            }

            pub fn amount(&self) -> u64 {
                self.common.details.amount
            }
        }
    };
}

// -- Creation inputs ----------------------------------------------------------

/// Bank-transfer payment to a virtual account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualAccountTransactionInput {
    common: TransactionCommon,
    bank: VirtualAccountBank,
    va_number: Option<String>,
}

impl_transaction_common!(VirtualAccountTransactionInput);

impl VirtualAccountTransactionInput {
    pub fn new(
        order_id: impl Into<String>,
        amount: u64,
        bank: VirtualAccountBank,
    ) -> Result<Self, InputError> {
        Ok(Self {
            common: TransactionCommon::new(order_id, amount)?,
            bank,
            va_number: None,
        })
    }

    /// Request a specific VA number.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::VaNumberNotSupported`] for banks that assign the
    /// number themselves and [`InputError::InvalidVaNumber`] for anything but
    /// 1-20 ASCII digits.
    pub fn with_va_number(mut self, va_number: impl Into<String>) -> Result<Self, InputError> {
        if !self.bank.accepts_custom_va_number() {
            return Err(InputError::VaNumberNotSupported(self.bank));
        }
        let va_number = va_number.into();
        if va_number.is_empty()
            || va_number.len() > 20
            || !va_number.chars().all(|c| c.is_ascii_digit())
        {
            return Err(InputError::InvalidVaNumber(va_number));
        }
        self.va_number = Some(va_number);
        Ok(self)
    }

    pub fn bank(&self) -> VirtualAccountBank {
        self.bank
    }

    pub fn va_number(&self) -> Option<&str> {
        self.va_number.as_deref()
    }
}

/// E-wallet payment (deeplink / QR on the hosted page).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EWalletTransactionInput {
    common: TransactionCommon,
    provider: EWalletProvider,
    callback_url: Option<Url>,
}

impl_transaction_common!(EWalletTransactionInput);

impl EWalletTransactionInput {
    pub fn new(
        order_id: impl Into<String>,
        amount: u64,
        provider: EWalletProvider,
    ) -> Result<Self, InputError> {
        Ok(Self {
            common: TransactionCommon::new(order_id, amount)?,
            provider,
            callback_url: None,
        })
    }

    /// URL the wallet app returns the customer to after payment.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::InvalidCallbackUrl`] unless `url` is an absolute URL.
    pub fn with_callback_url(mut self, url: &str) -> Result<Self, InputError> {
        let parsed = Url::parse(url)
            .map_err(|e| InputError::InvalidCallbackUrl(url.to_string(), e.to_string()))?;
        self.callback_url = Some(parsed);
        Ok(self)
    }

    pub fn provider(&self) -> EWalletProvider {
        self.provider
    }

    pub fn callback_url(&self) -> Option<&Url> {
        self.callback_url.as_ref()
    }
}

/// Over-the-counter payment at a convenience store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CStoreTransactionInput {
    common: TransactionCommon,
    store: ConvenienceStore,
    message: Option<String>,
}

impl_transaction_common!(CStoreTransactionInput);

impl CStoreTransactionInput {
    pub fn new(
        order_id: impl Into<String>,
        amount: u64,
        store: ConvenienceStore,
    ) -> Result<Self, InputError> {
        Ok(Self {
            common: TransactionCommon::new(order_id, amount)?,
            store,
            message: None,
        })
    }

    /// Text printed on the store receipt.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::EmptyField`] if the message is blank.
    pub fn with_message(mut self, message: impl Into<String>) -> Result<Self, InputError> {
        let message = message.into();
        if message.trim().is_empty() {
            return Err(InputError::EmptyField("message"));
        }
        self.message = Some(message);
        Ok(self)
    }

    pub fn store(&self) -> ConvenienceStore {
        self.store
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

/// Instrument kind of a creation input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransactionKind {
    VirtualAccount,
    EWallet,
    ConvenienceStore,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::VirtualAccount => "virtual_account",
            Self::EWallet => "ewallet",
            Self::ConvenienceStore => "cstore",
        }
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Any creation input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionInput {
    VirtualAccount(VirtualAccountTransactionInput),
    EWallet(EWalletTransactionInput),
    ConvenienceStore(CStoreTransactionInput),
}

impl TransactionInput {
    pub fn kind(&self) -> TransactionKind {
        match self {
            Self::VirtualAccount(_) => TransactionKind::VirtualAccount,
            Self::EWallet(_) => TransactionKind::EWallet,
            Self::ConvenienceStore(_) => TransactionKind::ConvenienceStore,
        }
    }

    pub fn common(&self) -> &TransactionCommon {
        match self {
            Self::VirtualAccount(i) => i.common(),
            Self::EWallet(i) => i.common(),
            Self::ConvenienceStore(i) => i.common(),
        }
    }

    pub fn order_id(&self) -> &OrderId {
        &self.common().details().order_id
    }
}

impl From<VirtualAccountTransactionInput> for TransactionInput {
    fn from(input: VirtualAccountTransactionInput) -> Self {
        Self::VirtualAccount(input)
    }
}

impl From<EWalletTransactionInput> for TransactionInput {
    fn from(input: EWalletTransactionInput) -> Self {
        Self::EWallet(input)
    }
}

impl From<CStoreTransactionInput> for TransactionInput {
    fn from(input: CStoreTransactionInput) -> Self {
        Self::ConvenienceStore(input)
    }
}

// -- Lookup inputs ------------------------------------------------------------

/// Look up an existing transaction by order id or gateway transaction id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckStatusInput {
    pub order_id: OrderId,
}

impl CheckStatusInput {
    pub fn new(order_id: impl Into<String>) -> Result<Self, InputError> {
        Ok(Self {
            order_id: OrderId::new(order_id)?,
        })
    }
}

/// Cancel an existing, not yet settled transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CancelInput {
    pub order_id: OrderId,
}

impl CancelInput {
    pub fn new(order_id: impl Into<String>) -> Result<Self, InputError> {
        Ok(Self {
            order_id: OrderId::new(order_id)?,
        })
    }
}
