//! The Envelope — the single message unit exchanged over the stream.
//!
//! An envelope carries either one chat line or one fragment of a file
//! transfer. The sole exception is the login announcement: the first
//! frame of a connection has a sender and no payload at all.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sender name used for hub-authored notices (login/logout).
pub const SERVER_SENDER: &str = "SERVER";

/// Prefix marking the synthetic sender of file-chunk envelopes.
///
/// Chunks are sent as `ftransfer_<user>` so they remain distinguishable
/// from that user's chat envelopes wherever logic keys on the sender.
pub const FILE_TRANSFER_PREFIX: &str = "ftransfer_";

/// One message unit on the wire.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Envelope {
    /// Session login name, or a synthetic transfer identifier.
    pub sender: String,
    /// Assigned by the producer at creation time.
    pub timestamp: DateTime<Utc>,
    /// Absent only on the login announcement.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Payload>,
}

/// The two payload kinds sharing the stream.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Payload {
    /// A chat line; may embed `[name.ext]` file-reference markers.
    Message {
        /// The (possibly rewritten) chat text.
        text: String,
    },
    /// One fragment of a file transfer.
    Chunk {
        /// Destination alias, stable across all chunks of one transfer.
        name: String,
        /// Raw fragment data; base64 on the wire.
        #[serde(with = "base64_bytes")]
        bytes: Vec<u8>,
        /// File extension including the dot, e.g. `.png`.
        format: String,
    },
}

impl Envelope {
    /// The login announcement: sender set, payload absent.
    pub fn login(sender: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
            timestamp: Utc::now(),
            payload: None,
        }
    }

    /// A chat message envelope.
    pub fn message(sender: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
            timestamp: Utc::now(),
            payload: Some(Payload::Message { text: text.into() }),
        }
    }

    /// A file-chunk envelope under the synthetic transfer sender.
    pub fn chunk(
        user: &str,
        name: impl Into<String>,
        bytes: Vec<u8>,
        format: impl Into<String>,
    ) -> Self {
        Self {
            sender: format!("{FILE_TRANSFER_PREFIX}{user}"),
            timestamp: Utc::now(),
            payload: Some(Payload::Chunk {
                name: name.into(),
                bytes,
                format: format.into(),
            }),
        }
    }

    /// A hub-authored notice ("X logged in!" / "X logged out!").
    pub fn server_notice(text: impl Into<String>) -> Self {
        Self::message(SERVER_SENDER, text)
    }

    /// Whether this envelope is the payload-less login announcement.
    pub fn is_login(&self) -> bool {
        self.payload.is_none()
    }
}

/// Serde adapter carrying chunk bytes as base64 inside JSON frames.
mod base64_bytes {
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD.decode(encoded).map_err(serde::de::Error::custom)
    }
}
