//! Chat client configuration.

use serde::{Deserialize, Serialize};

/// Client connection and local-storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// WebSocket URL of the chat hub.
    #[serde(default = "default_target")]
    pub target: String,
    /// Port for the local image retrieval endpoint.
    #[serde(default = "default_fileserver_port")]
    pub fileserver_port: u16,
    /// Directory where received and outgoing files live.
    #[serde(default = "default_saved_files_dir")]
    pub saved_files_dir: String,
    /// Gap in seconds after which a new transcript header is emitted
    /// even when the sender is unchanged.
    #[serde(default = "default_transcript_window")]
    pub transcript_window_seconds: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            target: default_target(),
            fileserver_port: default_fileserver_port(),
            saved_files_dir: default_saved_files_dir(),
            transcript_window_seconds: default_transcript_window(),
        }
    }
}

fn default_target() -> String {
    "ws://127.0.0.1:10000".to_string()
}

fn default_fileserver_port() -> u16 {
    1747
}

fn default_saved_files_dir() -> String {
    "savedfiles".to_string()
}

fn default_transcript_window() -> u64 {
    300
}
