//! # snap-client -- Typed Rust client for the Midtrans Snap API
//!
//! Creates hosted-checkout transactions for three instrument kinds and
//! returns the token and redirect URL the customer needs to pay:
//! - **Virtual account** (BCA, BNI, BRI, Permata, CIMB, Mandiri bill payment, other banks)
//! - **E-wallet** (GoPay, ShopeePay)
//! - **Convenience store** (Indomaret, Alfamart)
//!
//! Plus **status** lookup and **cancel** through the Core API.
//!
//! ## Architecture
//!
//! ```text
//! input ──► SnapInputFactory ──► RequestBody ──► SnapClient ──► Transport
//!                                                                  │
//! output ◄── SnapOutputFactory ◄── JSON ◄── status check ◄─────────┘
//! ```
//!
//! The HTTP layer sits behind the [`Transport`] trait. [`ReqwestTransport`] is
//! used by default; tests and callers with their own HTTP stack plug in
//! another implementation.
//!
//! ## Errors
//!
//! Operations fail with [`SnapError`]: `GatewayRejected` (unexpected status),
//! `MalformedResponse` (success status, invalid body) or `Transport`.
//! Construction fails with [`InputError`] or [`ConfigError`].

pub mod client;
pub mod config;
pub mod core_api;
pub mod credentials;
pub(crate) mod dispatch;
pub mod error;
pub mod input;
pub mod normalize;
pub mod output;
pub mod schema;
pub mod transport;

pub use client::SnapClient;
pub use config::{ConfigError, Endpoints, Environment, SnapConfig};
pub use core_api::CoreApiClient;
pub use credentials::Credentials;
pub use error::{FieldViolation, SnapError};
pub use input::{
    CStoreTransactionInput, CancelInput, CheckStatusInput, ConvenienceStore, CustomerDetails,
    EWalletProvider, EWalletTransactionInput, Expiry, ExpiryUnit, InputError, OrderId,
    TransactionInput, TransactionKind, VirtualAccountBank, VirtualAccountTransactionInput,
};
pub use normalize::{RequestBody, SnapInputFactory};
pub use output::{
    CStoreOutput, CheckStatusOutput, EWalletOutput, SnapOutput, SnapOutputFactory,
    TransactionStatus, VirtualAccountOutput, SNAP_CHANNEL,
};
pub use transport::{
    ReqwestTransport, RequestOptions, Transport, TransportError, TransportRequest,
    TransportResponse,
};
