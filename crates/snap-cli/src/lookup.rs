//! # Status and cancel subcommands
//!
//! ```bash
//! snap status INV-1
//! snap cancel INV-1
//! ```

use anyhow::{Context, Result};
use clap::Args;

use snap_client::{CancelInput, CheckStatusInput, SnapClient};

/// `snap status` / `snap cancel`
#[derive(Args, Debug, Clone)]
pub struct LookupArgs {
    /// Merchant order id or gateway transaction id.
    pub order_id: String,
}

/// Execute `snap status`.
pub async fn run_status(args: &LookupArgs, client: &SnapClient) -> Result<u8> {
    let input = CheckStatusInput::new(args.order_id.as_str()).context("invalid order id")?;
    crate::report(client.status(&input).await)
}

/// Execute `snap cancel`.
pub async fn run_cancel(args: &LookupArgs, client: &SnapClient) -> Result<u8> {
    let input = CancelInput::new(args.order_id.as_str()).context("invalid order id")?;
    crate::report(client.cancel(&input).await)
}
