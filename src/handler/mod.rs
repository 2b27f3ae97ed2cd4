//! Request handler module
//!
//! The responders bound to leaf resources, and the router that dispatches
//! incoming requests to them.

pub mod chunked;
pub mod fixed;
pub mod router;

use hyper::{HeaderMap, Response};

use crate::config::{ResourceConfig, ResourceKind};
use crate::http::OriginBody;

pub use chunked::ChunkedResponder;
pub use fixed::FixedResponder;
pub use router::{handle_request, OriginState};

/// Responder attached to a leaf resource
#[derive(Debug, Clone)]
pub enum Responder {
    Fixed(FixedResponder),
    Chunked(ChunkedResponder),
}

impl Responder {
    pub fn new(conf: &ResourceConfig) -> Self {
        match conf.kind {
            ResourceKind::Fixed => Self::Fixed(FixedResponder::new(conf)),
            ResourceKind::Chunked => Self::Chunked(ChunkedResponder::new(conf)),
        }
    }

    pub fn handle(&self, request_headers: &HeaderMap) -> Response<OriginBody> {
        match self {
            Self::Fixed(r) => r.handle(request_headers),
            Self::Chunked(r) => r.handle(request_headers),
        }
    }
}
