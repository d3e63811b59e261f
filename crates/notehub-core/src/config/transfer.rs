//! File transfer configuration.

use serde::{Deserialize, Serialize};

/// File chunking configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferConfig {
    /// Maximum size of a single file chunk in bytes.
    #[serde(default = "default_chunk_size")]
    pub chunk_size_bytes: usize,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            chunk_size_bytes: default_chunk_size(),
        }
    }
}

fn default_chunk_size() -> usize {
    128 * 1024
}
