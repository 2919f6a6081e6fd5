//! Logger module
//!
//! Installs the global `tracing` subscriber and provides the access log and
//! lifecycle helpers used by the server:
//! - Startup banner
//! - Access logging with multiple formats (emitted on the `access` target)

mod format;

pub use format::AccessLogEntry;

use crate::config::{Config, LogFormat, LoggingConfig};
use std::net::SocketAddr;
use thiserror::Error;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("invalid log filter: {0}")]
    Filter(#[from] tracing_subscriber::filter::ParseError),
    #[error("logger already installed: {0}")]
    Init(#[from] TryInitError),
}

/// Initialize the global subscriber
///
/// Should be called once at application startup. `RUST_LOG` wins over
/// `logging.level` when set.
pub fn init(config: &LoggingConfig) -> Result<(), LoggerError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.level)?,
    };
    let registry = tracing_subscriber::registry().with(filter);

    match config.format {
        LogFormat::Json => registry.with(fmt::layer().json()).try_init()?,
        LogFormat::Text => registry.with(fmt::layer()).try_init()?,
    }
    Ok(())
}

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    tracing::info!(
        address = %addr,
        workers = ?config.server.workers,
        asset_root = %config.assets.root.display(),
        api_prefix = %config.api.prefix,
        static_prefix = %config.assets.static_prefix,
        spa_fallback = config.assets.spa_fallback,
        cors = config.cors.enabled,
        max_connections = ?config.performance.max_connections,
        "edge router listening on http://{addr}"
    );
    let bindings = config.bindings.configured();
    if !bindings.is_empty() {
        tracing::info!(bindings = ?bindings, "bindings configured");
    }
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    tracing::info!(target: "access", "{}", entry.format(format));
}
