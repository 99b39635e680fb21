// src/observability.rs
//! Logging and metrics
//!
//! - Tracing: `tracing-subscriber` fmt layer filtered by `SENTRA_OFFLINE_LOG`
//!   (falling back to `RUST_LOG`, then `info`)
//! - Metrics: counters through the `metrics` facade; they are no-ops until
//!   the embedding application installs a recorder

use crate::interception::ConnectMode;
use crate::utils::errors::{BlockedConnectionError, OfflineError, Result};
use once_cell::sync::OnceCell;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter
pub const LOG_ENV: &str = "SENTRA_OFFLINE_LOG";

pub const METRIC_CONNECT_ATTEMPTS: &str = "sentra_offline_connect_attempts_total";
pub const METRIC_CONNECTIONS_BLOCKED: &str = "sentra_offline_connections_blocked_total";

static TRACING: OnceCell<()> = OnceCell::new();

/// Install the human-readable subscriber (idempotent)
pub fn init_tracing() -> Result<()> {
    init_tracing_with(false)
}

/// Install the subscriber, optionally emitting JSON lines (idempotent)
pub fn init_tracing_with(json: bool) -> Result<()> {
    TRACING
        .get_or_try_init(|| {
            let filter = env_filter();
            let builder = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .with_target(false);

            let installed = if json {
                builder.json().try_init()
            } else {
                builder.try_init()
            };

            installed.map_err(|e| {
                OfflineError::ConfigError(format!("Failed to install tracing subscriber: {}", e))
            })
        })
        .map(|_| ())
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

pub(crate) fn record_attempt(mode: ConnectMode) {
    metrics::counter!(METRIC_CONNECT_ATTEMPTS, "mode" => mode.as_str()).increment(1);
}

pub(crate) fn record_blocked(err: &BlockedConnectionError) {
    metrics::counter!(METRIC_CONNECTIONS_BLOCKED, "rule" => err.rule()).increment(1);
}
