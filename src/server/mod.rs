// Server module entry point
// Owns the listening socket and dispatches connections to the resource tree

pub mod connection;
pub mod listener;
pub mod signal;

// `loop` is a keyword, so the module file is mapped explicitly
#[path = "loop.rs"]
pub mod server_loop;

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;

pub use listener::create_reusable_listener;
pub use server_loop::start_server_loop;
pub use signal::shutdown_signal;

use crate::config::{LoggingConfig, OriginConfig};
use crate::error::OriginError;
use crate::handler::OriginState;
use crate::logger;
use crate::routing::ResourceTree;

/// The fake origin: an immutable resource tree behind one listener
pub struct OriginServer {
    listener: TcpListener,
    state: Arc<OriginState>,
}

impl OriginServer {
    /// Build the resource tree and bind the configured address.
    ///
    /// Configuration errors surface here, before any connection is accepted.
    pub fn bind(config: &OriginConfig, logging: LoggingConfig) -> Result<Self, OriginError> {
        logger::log_server_config(&config.server);
        let tree = ResourceTree::build(&config.actions)?;
        if tree.is_empty() {
            logger::log_warning("no resources configured, every request will get a 404");
        }
        let addr = config.server.socket_addr()?;
        let listener = create_reusable_listener(addr)
            .map_err(|source| OriginError::Bind { addr, source })?;

        Ok(Self {
            listener,
            state: Arc::new(OriginState { tree, logging }),
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Serve until `shutdown` resolves
    pub async fn run<F>(self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        start_server_loop(self.listener, self.state, shutdown).await;
    }
}
