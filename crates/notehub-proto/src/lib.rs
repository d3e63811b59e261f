//! # notehub-proto
//!
//! Wire-level protocol for Notehub: the [`Envelope`] message unit, the
//! JSON codec used over the WebSocket stream, and scanning of inline
//! file-reference markers in chat text.

pub mod codec;
pub mod envelope;
pub mod markers;

pub use envelope::{Envelope, Payload, FILE_TRANSFER_PREFIX, SERVER_SENDER};
