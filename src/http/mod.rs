//! HTTP protocol layer module
//!
//! Body pattern generation, Range parsing and response plumbing, decoupled
//! from how a resource decides what to send.

pub mod pattern;
pub mod range;
pub mod response;

// Re-export commonly used types
pub use range::{parse_range_header, parse_range_value, ByteRange, RangeSpec};
pub use response::{build_404_response, build_405_response, OriginBody};
