//! Outbound pipeline: user input → envelopes.
//!
//! Each entered line is scanned for file-reference markers. Every
//! referenced transfer is chunked before the line itself is sent, so a
//! chat line and its files stay visually correlated; the cost is the
//! whole line waiting on the slowest file read.

use tokio::sync::mpsc;

use notehub_core::{AppError, AppResult};
use notehub_proto::{Envelope, markers};

use crate::chunker::Chunker;

/// Turns raw input lines into a message envelope preceded by any chunk
/// envelopes its markers resolve to.
#[derive(Debug)]
pub struct OutboundPipeline {
    user: String,
    chunker: Chunker,
    out: mpsc::Sender<Envelope>,
}

impl OutboundPipeline {
    /// Creates the pipeline for one client session.
    pub fn new(user: impl Into<String>, chunker: Chunker, out: mpsc::Sender<Envelope>) -> Self {
        Self {
            user: user.into(),
            chunker,
            out,
        }
    }

    /// Resolves a line's markers and emits exactly one message envelope.
    ///
    /// A failed transfer annotates its marker inline and does not abort
    /// the remaining markers or the line. Only a closed outbound queue
    /// is propagated as an error.
    pub async fn submit(&mut self, line: &str) -> AppResult<()> {
        let mut text = line.to_string();

        // Duplicate markers resolve once; each replace already rewrites
        // every occurrence.
        let mut found: Vec<String> = Vec::new();
        for marker in markers::find_markers(line) {
            if !found.iter().any(|m| m == marker) {
                found.push(marker.to_string());
            }
        }

        for marker in &found {
            let filename = markers::marker_filename(marker);
            let rewritten = match self.chunker.chunk(filename, &self.out).await {
                Ok(alias) => format!("{marker}: {alias}"),
                Err(e) if e.kind == notehub_core::error::ErrorKind::Transport => return Err(e),
                Err(e) => format!("{marker}: {e}"),
            };
            text = text.replace(marker.as_str(), &rewritten);
        }

        self.out
            .send(Envelope::message(self.user.as_str(), text))
            .await
            .map_err(|_| AppError::transport("outbound queue closed"))
    }
}
