//! WebSocket accept loop for the chat hub.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{info, warn};

use notehub_core::config::server::ServerConfig;
use notehub_core::{AppError, AppResult};

use crate::registry::SessionRegistry;
use crate::session;

/// The chat hub server: one listener, one shared session registry.
#[derive(Debug)]
pub struct HubServer {
    listener: TcpListener,
    registry: Arc<SessionRegistry>,
}

impl HubServer {
    /// Binds the listener. Failure here is process-fatal by contract;
    /// the caller decides how to abort.
    pub async fn bind(config: &ServerConfig) -> AppResult<Self> {
        let addr = config.bind_addr();
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| AppError::transport(format!("failed to bind {addr}: {e}")))?;

        info!(addr = %addr, "chat hub listening");

        Ok(Self {
            listener,
            registry: Arc::new(SessionRegistry::new(config.session_buffer_size)),
        })
    }

    /// The bound local address (useful when binding port 0).
    pub fn local_addr(&self) -> AppResult<SocketAddr> {
        self.listener
            .local_addr()
            .map_err(|e| AppError::transport(format!("no local address: {e}")))
    }

    /// The shared session registry.
    pub fn registry(&self) -> Arc<SessionRegistry> {
        Arc::clone(&self.registry)
    }

    /// Accepts connections forever, one multiplexer task per client.
    /// Accept errors are logged and do not stop the loop.
    pub async fn run(self) -> AppResult<()> {
        loop {
            match self.listener.accept().await {
                Ok((stream, peer)) => {
                    let registry = Arc::clone(&self.registry);
                    tokio::spawn(session::handle_connection(registry, stream, peer));
                }
                Err(e) => {
                    warn!(error = %e, "failed to accept connection");
                }
            }
        }
    }
}
