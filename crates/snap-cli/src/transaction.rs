//! # Transaction creation subcommands
//!
//! ```bash
//! snap va --order-id INV-1 --amount 150000 --bank bca --va-number 12345678
//! snap ewallet --order-id INV-2 --amount 25000 --provider gopay \
//!     --callback-url https://merchant.example/done
//! snap cstore --order-id INV-3 --amount 30000 --store alfamart --message "Order 3"
//! ```

use anyhow::{Context, Result};
use clap::Args;

use snap_client::{
    CStoreTransactionInput, ConvenienceStore, CustomerDetails, EWalletProvider,
    EWalletTransactionInput, Expiry, ExpiryUnit, InputError, SnapClient, VirtualAccountBank,
    VirtualAccountTransactionInput,
};

/// Fields every creation subcommand accepts.
#[derive(Args, Debug, Clone)]
pub struct TransactionArgs {
    /// Merchant order id, unique per merchant.
    #[arg(long)]
    pub order_id: String,

    /// Gross amount in IDR.
    #[arg(long)]
    pub amount: u64,

    #[arg(long)]
    pub first_name: Option<String>,

    #[arg(long)]
    pub last_name: Option<String>,

    #[arg(long)]
    pub email: Option<String>,

    #[arg(long)]
    pub phone: Option<String>,

    /// Payment deadline, counted from creation.
    #[arg(long)]
    pub expiry_duration: Option<u32>,

    /// Unit of --expiry-duration (second, minute, hour, day).
    #[arg(long, default_value = "hour")]
    pub expiry_unit: ExpiryUnit,

    /// Metadata entry as KEY=VALUE. Repeatable.
    #[arg(long = "metadata", value_parser = parse_key_value)]
    pub metadata: Vec<(String, String)>,
}

/// `snap va`
#[derive(Args, Debug, Clone)]
pub struct VirtualAccountArgs {
    #[command(flatten)]
    pub transaction: TransactionArgs,

    /// Destination bank (bca, bni, bri, permata, cimb, mandiri, other).
    #[arg(long)]
    pub bank: VirtualAccountBank,

    /// Merchant-chosen VA number (1-20 digits).
    #[arg(long)]
    pub va_number: Option<String>,
}

/// `snap ewallet`
#[derive(Args, Debug, Clone)]
pub struct EWalletArgs {
    #[command(flatten)]
    pub transaction: TransactionArgs,

    /// Wallet provider (gopay, shopeepay).
    #[arg(long)]
    pub provider: EWalletProvider,

    /// Where the wallet app sends the customer after payment.
    #[arg(long)]
    pub callback_url: Option<String>,
}

/// `snap cstore`
#[derive(Args, Debug, Clone)]
pub struct CStoreArgs {
    #[command(flatten)]
    pub transaction: TransactionArgs,

    /// Store chain (indomaret, alfamart).
    #[arg(long)]
    pub store: ConvenienceStore,

    /// Text printed on the store receipt.
    #[arg(long)]
    pub message: Option<String>,
}

fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got {raw:?}"))?;
    Ok((key.to_string(), value.to_string()))
}

/// Builder methods the three creation inputs have in common.
trait CommonFields: Sized {
    fn customer(self, customer: CustomerDetails) -> Self;
    fn expiry(self, expiry: Expiry) -> Self;
    fn metadata(self, key: String, value: String) -> Result<Self, InputError>;
}

macro_rules! common_fields {
    ($($ty:ty),*) => {$(
        impl CommonFields for $ty {
            fn customer(self, customer: CustomerDetails) -> Self {
                self.with_customer(customer)
            }
            fn expiry(self, expiry: Expiry) -> Self {
                self.with_expiry(expiry)
            }
            fn metadata(self, key: String, value: String) -> Result<Self, InputError> {
                self.with_metadata(key, value)
            }
        }
    )*};
}

common_fields!(
    VirtualAccountTransactionInput,
    EWalletTransactionInput,
    CStoreTransactionInput
);

impl TransactionArgs {
    fn apply<T: CommonFields>(&self, mut input: T) -> Result<T> {
        input = input.customer(CustomerDetails {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
        });
        if let Some(duration) = self.expiry_duration {
            input = input.expiry(Expiry::new(duration, self.expiry_unit)?);
        }
        for (key, value) in &self.metadata {
            input = input.metadata(key.clone(), value.clone())?;
        }
        Ok(input)
    }
}

impl VirtualAccountArgs {
    pub fn to_input(&self) -> Result<VirtualAccountTransactionInput> {
        let t = &self.transaction;
        let mut input = VirtualAccountTransactionInput::new(&t.order_id, t.amount, self.bank)?;
        if let Some(va_number) = &self.va_number {
            input = input.with_va_number(va_number.as_str())?;
        }
        t.apply(input)
    }
}

impl EWalletArgs {
    pub fn to_input(&self) -> Result<EWalletTransactionInput> {
        let t = &self.transaction;
        let mut input = EWalletTransactionInput::new(&t.order_id, t.amount, self.provider)?;
        if let Some(url) = &self.callback_url {
            input = input.with_callback_url(url)?;
        }
        t.apply(input)
    }
}

impl CStoreArgs {
    pub fn to_input(&self) -> Result<CStoreTransactionInput> {
        let t = &self.transaction;
        let mut input = CStoreTransactionInput::new(&t.order_id, t.amount, self.store)?;
        if let Some(message) = &self.message {
            input = input.with_message(message.as_str())?;
        }
        t.apply(input)
    }
}

/// Execute `snap va`.
pub async fn run_virtual_account(args: &VirtualAccountArgs, client: &SnapClient) -> Result<u8> {
    let input = args.to_input().context("invalid virtual account transaction")?;
    crate::report(client.create_virtual_account(&input).await)
}

/// Execute `snap ewallet`.
pub async fn run_ewallet(args: &EWalletArgs, client: &SnapClient) -> Result<u8> {
    let input = args.to_input().context("invalid e-wallet transaction")?;
    crate::report(client.create_ewallet(&input).await)
}

/// Execute `snap cstore`.
pub async fn run_cstore(args: &CStoreArgs, client: &SnapClient) -> Result<u8> {
    let input = args.to_input().context("invalid convenience-store transaction")?;
    crate::report(client.create_convenience_store(&input).await)
}
