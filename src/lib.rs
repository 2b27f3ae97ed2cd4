//! Configuration-driven fake HTTP origin for exercising a caching proxy's
//! handling of chunked transfer encoding, byte ranges and partial objects.
//!
//! Resources are declared per method and path in a JSON document and served
//! by one of two responders:
//! - [`handler::FixedResponder`]: a fixed-length body with single-range support
//! - [`handler::ChunkedResponder`]: a paced sequence of chunks, clipped to the
//!   requested range when the body is the deterministic pattern
//!
//! Patterned bodies come from [`http::pattern`], so any byte range a client
//! receives can be checked without storing the payload.

pub mod config;
pub mod error;
pub mod handler;
pub mod http;
pub mod logger;
pub mod routing;
pub mod server;

pub use error::{ConfigError, OriginError, RangeError, TransportFailure};
pub use server::OriginServer;
