//! Per-connection stream multiplexer.
//!
//! Each accepted connection runs two halves for its lifetime: an
//! inbound loop handing every decoded envelope to the broadcast hub,
//! and an outbound forwarder draining the session's delivery queue back
//! onto the wire. The first failure on either side tears the session
//! down; errors never cross into other sessions.

use std::net::SocketAddr;
use std::sync::Arc;

use futures::stream::SplitStream;
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::WebSocketStream;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

use notehub_core::{AppError, AppResult};
use notehub_proto::{Envelope, codec};

use crate::registry::SessionRegistry;

/// Drives one accepted WebSocket connection to completion.
///
/// Performs the handshake, waits for the login envelope, registers the
/// session, and pumps both directions until the stream fails or closes.
/// Unregistration runs exactly once on every exit path past login.
pub async fn handle_connection(
    registry: Arc<SessionRegistry>,
    stream: TcpStream,
    peer: SocketAddr,
) {
    let socket = match tokio_tungstenite::accept_async(stream).await {
        Ok(s) => s,
        Err(e) => {
            warn!(peer = %peer, error = %e, "WebSocket handshake failed");
            return;
        }
    };

    let (mut ws_tx, mut ws_rx) = socket.split();

    // The first envelope only announces the sender; failures here
    // terminate the connection before any session exists.
    let login = match await_login(&mut ws_rx).await {
        Ok(env) => env,
        Err(e) => {
            warn!(peer = %peer, error = %e, "connection ended before login");
            return;
        }
    };

    let sender = login.sender.clone();
    if sender.is_empty() {
        warn!(peer = %peer, "rejecting login with empty sender");
        return;
    }
    if !login.is_login() {
        warn!(sender = %sender, peer = %peer, "first frame carried a payload, treating as login");
    }

    let (handle, mut outbound_rx) = registry.register(&sender);

    info!(sender = %sender, peer = %peer, "session connected");

    // Outbound half: drain this session's queue onto the wire.
    let mut outbound_task = tokio::spawn(async move {
        while let Some(envelope) = outbound_rx.recv().await {
            let frame = match codec::encode(&envelope) {
                Ok(f) => f,
                Err(e) => {
                    warn!(error = %e, "failed to encode outbound envelope");
                    continue;
                }
            };
            if ws_tx.send(frame).await.is_err() {
                break;
            }
        }
    });

    // Inbound half: every decoded envelope is broadcast unconditionally,
    // chat and chunk variants alike.
    let inbound = async {
        while let Some(result) = ws_rx.next().await {
            match result {
                Ok(Message::Text(text)) => match codec::decode(&text) {
                    Ok(envelope) => {
                        debug!(sender = %envelope.sender, "received envelope");
                        registry.broadcast(&envelope);
                    }
                    Err(e) => {
                        warn!(sender = %sender, error = %e, "dropping malformed frame");
                    }
                },
                Ok(Message::Close(_)) => break,
                Ok(_) => {}
                Err(e) => {
                    warn!(sender = %sender, error = %e, "stream error");
                    break;
                }
            }
        }
    };

    // The first half to finish ends the session. A failed write or a
    // queue closed by replacement must not leave a half-open reader
    // registered.
    tokio::select! {
        _ = inbound => {}
        _ = &mut outbound_task => {
            debug!(sender = %sender, "outbound half ended first");
        }
    }

    outbound_task.abort();
    registry.unregister(&sender, &handle);

    info!(sender = %sender, peer = %peer, "session closed");
}

/// Blocks for the first envelope of a new connection.
async fn await_login(
    ws_rx: &mut SplitStream<WebSocketStream<TcpStream>>,
) -> AppResult<Envelope> {
    while let Some(result) = ws_rx.next().await {
        match result.map_err(|e| AppError::transport(format!("receive failed: {e}")))? {
            Message::Text(text) => return codec::decode(&text),
            Message::Close(_) => {
                return Err(AppError::transport("stream closed before login"));
            }
            _ => {}
        }
    }
    Err(AppError::transport("stream ended before login"))
}
