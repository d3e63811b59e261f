//! Session registry and broadcast hub.
//!
//! The registry is the only shared mutable structure on the server: a
//! mapping from an active sender name to that session's outbound
//! delivery queue. It is never exposed raw; callers get exactly
//! `register`, `unregister`, and `broadcast`.

use dashmap::DashMap;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, info, warn};

use notehub_proto::Envelope;

/// Process-wide table of connected sessions.
#[derive(Debug)]
pub struct SessionRegistry {
    /// Sender name → outbound delivery queue.
    sessions: DashMap<String, mpsc::Sender<Envelope>>,
    /// Queue depth per session.
    buffer_size: usize,
}

impl SessionRegistry {
    /// Creates an empty registry with the given per-session queue depth.
    pub fn new(buffer_size: usize) -> Self {
        Self {
            sessions: DashMap::new(),
            buffer_size,
        }
    }

    /// Registers a session, returning an identity handle for this
    /// registration and the receiver its drain task pulls from.
    ///
    /// Re-registering an active name replaces the prior entry (last
    /// writer wins); the replaced queue closes, which ends the old
    /// session's drain task. The handle is weak so holding it does not
    /// keep a replaced queue open. A "logged in!" notice is broadcast
    /// after insertion, so the new session receives its own
    /// announcement.
    pub fn register(&self, sender: &str) -> (mpsc::WeakSender<Envelope>, mpsc::Receiver<Envelope>) {
        let (tx, rx) = mpsc::channel(self.buffer_size);
        let handle = tx.downgrade();

        if self.sessions.insert(sender.to_string(), tx).is_some() {
            warn!(sender = %sender, "replacing existing session with the same name");
        }

        info!(sender = %sender, sessions = self.sessions.len(), "session registered");

        self.broadcast(&Envelope::server_notice(format!("{sender} logged in!")));
        (handle, rx)
    }

    /// Removes a session and announces the departure to the rest.
    ///
    /// Removal is keyed on the registration handle, not the name alone:
    /// a session that was replaced must not evict its successor while
    /// tearing itself down. Unknown names and stale handles are a
    /// no-op, with no notice.
    pub fn unregister(&self, sender: &str, handle: &mpsc::WeakSender<Envelope>) {
        // A handle that no longer upgrades belongs to a queue the
        // registry already dropped, via replacement or a prior call.
        let Some(queue) = handle.upgrade() else {
            return;
        };
        let removed = self
            .sessions
            .remove_if(sender, |_, current| current.same_channel(&queue))
            .is_some();
        if !removed {
            return;
        }

        info!(sender = %sender, sessions = self.sessions.len(), "session unregistered");

        self.broadcast(&Envelope::server_notice(format!("{sender} logged out!")));
    }

    /// Delivers one copy of `envelope` to every registered session.
    ///
    /// Delivery is non-blocking: a full queue drops that session's copy
    /// rather than stalling the others, and a queue whose session is
    /// mid-teardown is skipped. The recipient set is whatever the
    /// mapping holds at iteration time.
    pub fn broadcast(&self, envelope: &Envelope) {
        for entry in self.sessions.iter() {
            match entry.value().try_send(envelope.clone()) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) => {
                    warn!(
                        session = %entry.key(),
                        sender = %envelope.sender,
                        "outbound queue full, dropping envelope"
                    );
                }
                Err(TrySendError::Closed(_)) => {
                    debug!(session = %entry.key(), "outbound queue closed, skipping");
                }
            }
        }
    }

    /// Number of currently registered sessions.
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Whether a session is registered under `sender`.
    pub fn contains(&self, sender: &str) -> bool {
        self.sessions.contains_key(sender)
    }
}
