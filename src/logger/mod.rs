//! Logger module
//!
//! Named logging entry points for the server, emitted as `tracing` events:
//! - Server lifecycle logging
//! - Access logging with multiple formats (target `access`)
//! - Error and warning logging

mod format;

pub use format::{AccessLogEntry, AccessLogFormat};

use crate::config::Config;
use crate::store::StoreError;
use std::net::SocketAddr;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::EnvFilter;

/// Install the global subscriber
///
/// `RUST_LOG` wins over `logging.level` when set. Should be called once at
/// application startup.
pub fn init(config: &Config) -> Result<(), TryInitError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .try_init()
}

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    tracing::info!(
        %addr,
        level = %config.logging.level,
        backend = ?config.database.backend,
        "Async server started successfully, listening on http://{addr}"
    );
    if let Some(workers) = config.server.workers {
        tracing::info!("Worker threads: {workers}");
    }
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    tracing::debug!(%peer_addr, "Connection accepted");
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    tracing::error!("Failed to serve connection: {err:?}");
}

pub fn log_error(message: &str) {
    tracing::error!("{message}");
}

pub fn log_warning(message: &str) {
    tracing::warn!("{message}");
}

pub fn log_headers_count(count: usize, show: bool) {
    if show {
        tracing::info!("[Headers] Count: {count}");
    }
}

/// Log a store failure together with the operation that hit it
pub fn log_store_error(operation: &str, err: &StoreError) {
    tracing::error!(operation, kind = err.kind(), "Store operation failed: {err}");
}

pub fn log_schema_ready() {
    tracing::info!("Record store schema ready");
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &AccessLogFormat) {
    tracing::info!(target: "access", "{}", entry.format(format));
}

pub fn log_shutdown_requested(reason: &str) {
    tracing::info!(reason, "Initiating graceful shutdown");
}

pub fn log_shutdown() {
    tracing::info!("Shutdown requested, no longer accepting connections");
}
