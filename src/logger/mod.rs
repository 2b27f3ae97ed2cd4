//! Logger module
//!
//! Thin helpers over `tracing` so call sites read the same everywhere:
//! - Server lifecycle logging
//! - Request and access logging (see [`AccessLogEntry`])
//! - Range fallbacks and client disconnects

mod format;

pub use format::AccessLogEntry;

use std::net::SocketAddr;

use hyper::{Method, Uri, Version};
use tracing::level_filters::LevelFilter;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::ServerConfig;
use crate::error::{RangeError, TransportFailure};

/// Initialize the global subscriber with `level` (`RUST_LOG` directives win).
///
/// Should be called once at application startup.
pub fn init(level: &str) {
    let level = match level.to_lowercase().as_str() {
        "trace" => LevelFilter::TRACE,
        "debug" => LevelFilter::DEBUG,
        "warn" => LevelFilter::WARN,
        "error" => LevelFilter::ERROR,
        "off" => LevelFilter::OFF,
        _ => LevelFilter::INFO,
    };

    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

pub fn log_server_start(addr: &SocketAddr, process: &str, routes: usize) {
    info!(%addr, process, routes, "origin listening on http://{addr}");
}

pub fn log_server_config(server: &ServerConfig) {
    debug!(host = %server.host, port = server.port, "server configuration loaded");
}

pub fn log_shutdown() {
    info!("shutdown signal received, no longer accepting connections");
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    debug!(%peer_addr, "connection accepted");
}

pub fn log_connection_error(err: &impl std::fmt::Display) {
    debug!(error = %err, "connection closed with error");
}

pub fn log_request(method: &Method, uri: &Uri, version: Version) {
    debug!(%method, %uri, ?version, "request");
}

pub fn log_range_ignored(err: &RangeError) {
    warn!(error = %err, "ignoring range header");
}

pub fn log_client_gone(err: &TransportFailure) {
    debug!(error = %err, "chunk schedule aborted");
}

pub fn log_error(message: &str) {
    error!("{message}");
}

pub fn log_warning(message: &str) {
    warn!("{message}");
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    info!(target: "access", "{}", entry.format(format));
}

/// `1.1` style label used in request lines
pub fn version_label(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        Version::HTTP_3 => "3",
        _ => "1.1",
    }
}
