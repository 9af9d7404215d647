//! # snap CLI entry point
//!
//! Parses command-line arguments, builds a [`snap_client::SnapClient`] from
//! the environment, and dispatches to subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use snap_cli::lookup::{run_cancel, run_status, LookupArgs};
use snap_cli::transaction::{
    run_cstore, run_ewallet, run_virtual_account, CStoreArgs, EWalletArgs, VirtualAccountArgs,
};
use snap_cli::{build_client, GlobalArgs, EXIT_USAGE};

/// Midtrans Snap command-line client.
///
/// Creates hosted-checkout transactions and looks up or cancels them.
/// Requires SNAP_SERVER_KEY in the environment.
#[derive(Parser, Debug)]
#[command(name = "snap", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a virtual-account (bank transfer) transaction.
    Va(VirtualAccountArgs),

    /// Create an e-wallet transaction.
    Ewallet(EWalletArgs),

    /// Create a convenience-store transaction.
    Cstore(CStoreArgs),

    /// Look up a transaction.
    Status(LookupArgs),

    /// Cancel a transaction that has not settled.
    Cancel(LookupArgs),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let client = match build_client(&cli.global) {
        Ok(client) => client,
        Err(e) => {
            tracing::error!("{e:#}");
            return ExitCode::from(EXIT_USAGE);
        }
    };

    let result = match &cli.command {
        Commands::Va(args) => run_virtual_account(args, &client).await,
        Commands::Ewallet(args) => run_ewallet(args, &client).await,
        Commands::Cstore(args) => run_cstore(args, &client).await,
        Commands::Status(args) => run_status(args, &client).await,
        Commands::Cancel(args) => run_cancel(args, &client).await,
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(EXIT_USAGE)
        }
    }
}
