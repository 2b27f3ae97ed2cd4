//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: resolves the resource for the
//! request's method and path, hands the request headers to its responder and
//! writes the access log line.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use hyper::header::{CONTENT_LENGTH, RANGE, USER_AGENT};
use hyper::{Request, Response};

use crate::config::LoggingConfig;
use crate::http::{self, OriginBody};
use crate::logger::{self, AccessLogEntry};
use crate::routing::{Lookup, ResourceTree};

/// Shared, immutable state handed to every connection
#[derive(Debug)]
pub struct OriginState {
    pub tree: ResourceTree,
    pub logging: LoggingConfig,
}

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<OriginState>,
    peer_addr: SocketAddr,
) -> Result<Response<OriginBody>, Infallible> {
    let started = Instant::now();
    let method = req.method();
    let path = req.uri().path();

    logger::log_request(method, req.uri(), req.version());

    let response = match state.tree.lookup(method, path) {
        Lookup::Found(responder) => responder.handle(req.headers()),
        Lookup::MethodNotAllowed(allowed) => {
            logger::log_warning(&format!("Method not allowed: {method} {path}"));
            http::build_405_response(&allowed)
        }
        Lookup::NotFound => http::build_404_response(),
    };

    if state.logging.access_log {
        let mut entry = AccessLogEntry::new(
            peer_addr.ip().to_string(),
            method.to_string(),
            path.to_string(),
        );
        entry.query = req.uri().query().map(ToString::to_string);
        entry.http_version = logger::version_label(req.version()).to_string();
        entry.status = response.status().as_u16();
        entry.body_bytes = response
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok());
        entry.range = req
            .headers()
            .get(RANGE)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string);
        entry.user_agent = req
            .headers()
            .get(USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string);
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry, &state.logging.access_log_format);
    }

    Ok(response)
}
