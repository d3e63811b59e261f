//! # notehub-client
//!
//! Client side of Notehub: the connection driver holding the duplex
//! stream, the file chunker and outbound pipeline, the reassembler that
//! applies inbound envelopes, and the local image retrieval endpoint.

pub mod chunker;
pub mod connection;
pub mod fileserver;
pub mod outbound;
pub mod reassembler;
pub mod store;
pub mod transcript;

pub use chunker::Chunker;
pub use connection::{Connection, StreamEvent};
pub use outbound::OutboundPipeline;
pub use reassembler::Reassembler;
pub use store::FileStore;
pub use transcript::Transcript;
