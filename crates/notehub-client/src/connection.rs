//! Client connection driver.
//!
//! Owns the duplex stream: a spawned receive pump feeds decoded
//! envelopes into the inbound queue, and a send pump drains the single
//! outbound queue onto the wire. Stream termination is surfaced as an
//! explicit event rather than silently ending the process; reconnecting
//! is the caller's decision. Dropping the connection aborts both pumps,
//! which closes the stream.

use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, warn};

use notehub_core::{AppError, AppResult};
use notehub_proto::{Envelope, codec};

const QUEUE_DEPTH: usize = 256;

/// What the receive pump hands to the consumer.
#[derive(Debug)]
pub enum StreamEvent {
    /// One decoded inbound envelope.
    Envelope(Envelope),
    /// The stream terminated; no further envelopes will arrive.
    Closed {
        /// Human-readable cause (clean close or transport error).
        reason: String,
    },
}

/// A live connection to the hub.
#[derive(Debug)]
pub struct Connection {
    inbound: mpsc::Receiver<StreamEvent>,
    outbound: mpsc::Sender<Envelope>,
    recv_task: JoinHandle<()>,
    send_task: JoinHandle<()>,
}

impl Connection {
    /// Dials the hub and announces `user` with the login envelope.
    ///
    /// Failure to establish the stream at startup is process-fatal by
    /// contract; the caller aborts.
    pub async fn establish(target: &str, user: &str) -> AppResult<Self> {
        let (socket, _) = connect_async(target)
            .await
            .map_err(|e| AppError::transport(format!("failed to dial {target}: {e}")))?;

        let (mut ws_tx, mut ws_rx) = socket.split();

        let login = codec::encode(&Envelope::login(user))?;
        ws_tx
            .send(login)
            .await
            .map_err(|e| AppError::transport(format!("login send failed: {e}")))?;

        let (in_tx, in_rx) = mpsc::channel(QUEUE_DEPTH);
        let (out_tx, mut out_rx) = mpsc::channel::<Envelope>(QUEUE_DEPTH);

        // Receive pump.
        let recv_task = tokio::spawn(async move {
            let reason = loop {
                match ws_rx.next().await {
                    Some(Ok(Message::Text(text))) => match codec::decode(&text) {
                        Ok(envelope) => {
                            if in_tx.send(StreamEvent::Envelope(envelope)).await.is_err() {
                                return;
                            }
                        }
                        Err(e) => {
                            warn!(error = %e, "dropping malformed inbound frame");
                        }
                    },
                    Some(Ok(Message::Close(_))) | None => break "stream closed".to_string(),
                    Some(Ok(_)) => {}
                    Some(Err(e)) => break format!("stream error: {e}"),
                }
            };
            debug!(reason = %reason, "receive pump ended");
            let _ = in_tx.send(StreamEvent::Closed { reason }).await;
        });

        // Send pump.
        let send_task = tokio::spawn(async move {
            while let Some(envelope) = out_rx.recv().await {
                let frame = match codec::encode(&envelope) {
                    Ok(f) => f,
                    Err(e) => {
                        warn!(error = %e, "failed to encode outbound envelope");
                        continue;
                    }
                };
                if let Err(e) = ws_tx.send(frame).await {
                    warn!(error = %e, "send failed, stopping send pump");
                    break;
                }
            }
        });

        Ok(Self {
            inbound: in_rx,
            outbound: out_tx,
            recv_task,
            send_task,
        })
    }

    /// The next inbound event; `None` after [`StreamEvent::Closed`] has
    /// been consumed and the pump has finished.
    pub async fn next_event(&mut self) -> Option<StreamEvent> {
        self.inbound.recv().await
    }

    /// A handle onto the outbound queue, safe to clone into producers.
    pub fn sender(&self) -> mpsc::Sender<Envelope> {
        self.outbound.clone()
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.recv_task.abort();
        self.send_task.abort();
    }
}
