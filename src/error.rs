//! Error taxonomy
//!
//! - [`ConfigError`]: fatal, raised while loading settings or building the
//!   resource tree. Startup aborts.
//! - [`RangeError`]: recoverable. Responders log it and fall back to the
//!   un-ranged response; it never reaches the client as a 4xx.
//! - [`TransportFailure`]: the client went away mid-response. Ends the chunk
//!   schedule silently.

use std::net::SocketAddr;

use thiserror::Error;

/// Failures that stop the origin from starting
#[derive(Debug, Error)]
pub enum OriginError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
}

/// Configuration errors detected before the server accepts connections.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("conf for '{method}:{path}' is missing type")]
    MissingType { method: String, path: String },

    #[error("conf for '{method}:{path}' has unknown type '{kind}'")]
    UnknownType {
        method: String,
        path: String,
        kind: String,
    },

    #[error("leaf cannot contain children: '{method}:{path}'")]
    LeafHasChildren { method: String, path: String },

    #[error("route '{method}:{path}' is registered twice")]
    DuplicateRoute { method: String, path: String },

    #[error("invalid HTTP method '{0}'")]
    InvalidMethod(String),

    #[error("invalid path '{0}': must start with '/'")]
    InvalidPath(String),

    #[error("conf for '{method}:{path}': {reason}")]
    InvalidResource {
        method: String,
        path: String,
        reason: String,
    },

    #[error("invalid listen address {0}")]
    InvalidAddress(String),

    #[error("configuration has no '{0}' section")]
    MissingSection(String),

    #[error("configuration has no '{0}' process")]
    MissingProcess(String),

    #[error("'interfaces:http:port' does not exist for process '{0}'")]
    MissingPort(String),

    #[error("'actions' does not exist for process '{0}'")]
    MissingActions(String),

    #[error("config file '{path}' could not be read: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid settings: {0}")]
    Settings(#[from] ::config::ConfigError),
}

/// Range header failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RangeError {
    /// The header value is not a `bytes=<start>-<end>` range we understand
    #[error("malformed range header {0:?}")]
    Malformed(String),

    /// The range is well formed but does not fit the body
    #[error("range {start}-{end} is outside a body of {len} bytes")]
    Invalid { start: u64, end: u64, len: u64 },
}

impl RangeError {
    pub(crate) fn malformed(value: &str) -> Self {
        Self::Malformed(value.to_string())
    }
}

/// The response body was dropped by the connection, usually because the
/// client disconnected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("client disconnected before the response completed")]
pub struct TransportFailure;
