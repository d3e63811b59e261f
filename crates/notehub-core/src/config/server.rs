//! Chat hub server configuration.

use serde::{Deserialize, Serialize};

/// Chat hub listener configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address.
    #[serde(default = "default_host")]
    pub host: String,
    /// Bind port.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Outbound delivery queue depth per session.
    ///
    /// A session whose queue is full has further broadcasts dropped
    /// rather than stalling delivery to other sessions.
    #[serde(default = "default_session_buffer")]
    pub session_buffer_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            session_buffer_size: default_session_buffer(),
        }
    }
}

impl ServerConfig {
    /// The listen address in `host:port` form.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    10000
}

fn default_session_buffer() -> usize {
    256
}
