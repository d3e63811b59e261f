//! Inbound envelope application.
//!
//! Message payloads go to the transcript; chunk payloads are appended
//! to their destination object in arrival order. No reordering is
//! performed: if the transport delivers chunks out of order the
//! reassembled object is corrupt, an accepted best-effort limitation.

use tracing::debug;

use notehub_core::AppResult;
use notehub_proto::{Envelope, Payload};

use crate::store::FileStore;
use crate::transcript::Transcript;

/// Applies inbound envelopes to the transcript and the file store.
#[derive(Debug)]
pub struct Reassembler {
    store: FileStore,
    transcript: Transcript,
}

impl Reassembler {
    /// Creates a reassembler over the given store and transcript.
    pub fn new(store: FileStore, transcript: Transcript) -> Self {
        Self { store, transcript }
    }

    /// Applies one envelope, returning any transcript lines to display.
    pub async fn apply(&mut self, envelope: &Envelope) -> AppResult<Vec<String>> {
        match &envelope.payload {
            Some(Payload::Message { text }) => {
                Ok(self
                    .transcript
                    .push(&envelope.sender, envelope.timestamp, text))
            }
            Some(Payload::Chunk { name, bytes, .. }) => {
                self.store.append(name, bytes).await?;
                debug!(name = %name, bytes = bytes.len(), "chunk applied");
                Ok(Vec::new())
            }
            // Login announcements are not broadcast, but tolerate one.
            None => Ok(Vec::new()),
        }
    }
}
