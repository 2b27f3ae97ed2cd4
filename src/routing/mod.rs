//! Routing module
//!
//! Maps an HTTP method and slash-delimited path to the responder configured
//! for it.

mod tree;

pub use tree::{Lookup, ResourceNode, ResourceTree};
