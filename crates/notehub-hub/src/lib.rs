//! # notehub-hub
//!
//! Server side of Notehub: the session registry and broadcast hub, the
//! per-connection stream multiplexer, and the WebSocket accept loop.

pub mod registry;
pub mod server;
pub mod session;

pub use registry::SessionRegistry;
pub use server::HubServer;
