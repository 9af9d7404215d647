//! # snap-cli -- Command-line front end for snap-client
//!
//! Provides the `snap` binary:
//!
//! - `snap va` / `snap ewallet` / `snap cstore` -- create a Snap transaction.
//! - `snap status <ORDER_ID>` -- look up a transaction.
//! - `snap cancel <ORDER_ID>` -- cancel a pending transaction.
//!
//! Configuration comes from `SNAP_*` environment variables (see
//! [`snap_client::SnapConfig::from_env`]); `--environment`, `--base-url` and
//! `--timeout-secs` override them for a single invocation.
//!
//! ```bash
//! SNAP_SERVER_KEY=SB-Mid-server-... snap va --order-id INV-1 --amount 150000 --bank bca
//! snap status INV-1
//! ```
//!
//! Results are printed to stdout as JSON. Exit codes:
//!
//! | Code | Meaning |
//! |------|---------|
//! | 0 | success |
//! | 1 | invalid input or configuration |
//! | 2 | gateway rejected the request |
//! | 3 | gateway returned a malformed response |
//! | 4 | transport failure |

pub mod lookup;
pub mod transaction;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use snap_client::{Endpoints, SnapClient, SnapConfig, SnapError};

/// Exit code for errors that never reached the gateway.
pub const EXIT_USAGE: u8 = 1;

/// Options shared by every subcommand.
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Gateway environment (`sandbox` or `production`). Overrides SNAP_ENVIRONMENT.
    #[arg(long, global = true)]
    pub environment: Option<String>,

    /// Send both Snap and Core API requests to this origin instead (mocks, proxies).
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Request timeout in seconds. Overrides SNAP_TIMEOUT_SECS.
    #[arg(long, global = true)]
    pub timeout_secs: Option<u64>,
}

/// Resolve configuration from `lookup` with command-line overrides applied.
pub fn config_from<F>(global: &GlobalArgs, lookup: F) -> Result<SnapConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = SnapConfig::from_lookup(|key| match key {
        "SNAP_ENVIRONMENT" => global.environment.clone().or_else(|| lookup(key)),
        _ => lookup(key),
    })
    .context("failed to load Snap configuration")?;

    if let Some(secs) = global.timeout_secs {
        config = config.with_timeout_secs(secs);
    }
    if let Some(base_url) = &global.base_url {
        config = config.with_endpoints(
            Endpoints::single(base_url).with_context(|| format!("invalid --base-url {base_url}"))?,
        );
    }
    Ok(config)
}

/// Build a client from the process environment and `global`.
pub fn build_client(global: &GlobalArgs) -> Result<SnapClient> {
    let config = config_from(global, |key| std::env::var(key).ok())?;
    tracing::debug!(environment = %config.environment, "resolved Snap configuration");
    SnapClient::new(config).context("failed to build Snap client")
}

/// Exit code for a failed gateway call.
pub fn exit_code(err: &SnapError) -> u8 {
    match err {
        SnapError::GatewayRejected { .. } => 2,
        SnapError::MalformedResponse { .. } => 3,
        SnapError::Transport(_) => 4,
    }
}

/// Print a gateway result as pretty JSON, or report the error.
pub fn report<T: Serialize>(result: Result<T, SnapError>) -> Result<u8> {
    match result {
        Ok(output) => {
            println!("{}", serde_json::to_string_pretty(&output)?);
            Ok(0)
        }
        Err(err) => {
            tracing::error!("{err}");
            if let SnapError::GatewayRejected { body, .. } = &err {
                eprintln!("{body}");
            }
            Ok(exit_code(&err))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use snap_client::Environment;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn environment_flag_overrides_variable() {
        let global = GlobalArgs {
            environment: Some("production".into()),
            ..Default::default()
        };
        let config = config_from(
            &global,
            lookup_from(&[("SNAP_ENVIRONMENT", "sandbox"), ("SNAP_SERVER_KEY", "Mid-server-x")]),
        )
        .unwrap();
        assert_eq!(config.environment, Environment::Production);
        assert_eq!(config.endpoints.snap.as_str(), "https://app.midtrans.com/");
    }

    #[test]
    fn base_url_and_timeout_flags_apply() {
        let global = GlobalArgs {
            environment: None,
            base_url: Some("http://127.0.0.1:8080".into()),
            timeout_secs: Some(3),
        };
        let config = config_from(&global, lookup_from(&[("SNAP_SERVER_KEY", "SB-Mid-server-x")]))
            .unwrap();
        assert_eq!(config.environment, Environment::Sandbox);
        assert_eq!(config.endpoints.core_api.as_str(), "http://127.0.0.1:8080/");
        assert_eq!(config.timeout_secs, 3);
    }

    #[test]
    fn missing_server_key_is_an_error() {
        let err = config_from(&GlobalArgs::default(), lookup_from(&[])).unwrap_err();
        assert!(format!("{err:#}").contains("SNAP_SERVER_KEY"));
    }

    #[test]
    fn exit_codes_follow_error_class() {
        let rejected = SnapError::GatewayRejected {
            endpoint: "POST /snap/v1/transactions".into(),
            status: 400,
            body: "{}".into(),
        };
        let malformed = SnapError::MalformedResponse {
            endpoint: "POST /snap/v1/transactions".into(),
            violations: vec![],
            raw: serde_json::json!({}),
        };
        assert_eq!(exit_code(&rejected), 2);
        assert_eq!(exit_code(&malformed), 3);
    }
}
