//! Daemon boot: settings and bind address, resolved before the router exists.
//!
//! Any config fault fails here, at startup, rather than on each request.

use std::{future::Future, io, net::SocketAddr};

use anyhow::{Context, Result};
use postcalc_config::{
    report_unused_keys, CalculatorSettings, ConfigMode, LoadedConfig, UnusedKeyPolicy,
};
use tracing::{error, info, warn};

/// Typed settings for the daemon. Unused keys warn; bad values are errors.
pub fn load_settings(loaded: &LoadedConfig) -> Result<CalculatorSettings> {
    let report = report_unused_keys(ConfigMode::Daemon, &loaded.config_json, UnusedKeyPolicy::Warn)?;
    for ptr in &report.unused_leaf_pointers {
        warn!(pointer = %ptr, "config key not read by postcalc-daemon");
    }
    CalculatorSettings::from_config_json(&loaded.config_json).context("invalid config")
}

/// `POSTCALC_DAEMON_ADDR` when set, else `/daemon/addr`. A value that is set
/// but does not parse is an error; it never falls through to the next source.
pub fn resolve_bind_addr(env_addr: Option<&str>, config_addr: &str) -> Result<SocketAddr> {
    match env_addr {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("invalid POSTCALC_DAEMON_ADDR: {raw}")),
        None => config_addr
            .parse()
            .with_context(|| format!("invalid /daemon/addr: {config_addr}")),
    }
}

/// Resolves when `signal` fires. If the signal handler could not be
/// installed, log it and never resolve, so the server keeps serving.
pub async fn shutdown_on<F>(signal: F)
where
    F: Future<Output = io::Result<()>>,
{
    match signal.await {
        Ok(()) => info!("shutdown requested"),
        Err(e) => {
            error!(error = %e, "shutdown signal unavailable; graceful shutdown disabled");
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_address_wins_over_config() {
        let addr = resolve_bind_addr(Some("0.0.0.0:9000"), "127.0.0.1:8898").unwrap();
        assert_eq!(addr.port(), 9000);
    }

    #[test]
    fn config_address_used_without_env() {
        let addr = resolve_bind_addr(None, "127.0.0.1:8898").unwrap();
        assert_eq!(addr.port(), 8898);
    }

    #[test]
    fn malformed_env_address_is_an_error() {
        let err = resolve_bind_addr(Some("localhost:eighty"), "127.0.0.1:8898").unwrap_err();
        assert!(format!("{err:#}").contains("POSTCALC_DAEMON_ADDR"));
    }

    #[tokio::test]
    async fn signal_fires_shutdown() {
        let done = tokio::time::timeout(
            std::time::Duration::from_millis(200),
            shutdown_on(async { Ok(()) }),
        )
        .await;
        assert!(done.is_ok());
    }

    #[tokio::test]
    async fn failed_signal_install_keeps_serving() {
        let done = tokio::time::timeout(
            std::time::Duration::from_millis(50),
            shutdown_on(async { Err(io::Error::new(io::ErrorKind::Other, "no handler")) }),
        )
        .await;
        assert!(done.is_err(), "must not resolve when the handler is missing");
    }
}
