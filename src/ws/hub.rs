//! Broadcast hub: fan-out of server events to connected sessions.
//!
//! One outbound channel per session, keyed by session id. Delivery is
//! best-effort with no cross-session ordering; within one channel the
//! mpsc queue preserves the order announcements were made. A failed send
//! means the receiver is gone, so the channel is dropped on the spot
//! rather than waiting for the actor's own cleanup to run.

use std::sync::Arc;

use axum::extract::ws::Message;
use dashmap::DashMap;

use crate::session::SessionId;
use crate::ws::protocol::ServerEvent;
use crate::ws::ConnectionSender;

#[derive(Clone, Default)]
pub struct BroadcastHub {
    channels: Arc<DashMap<SessionId, ConnectionSender>>,
}

impl BroadcastHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a session's delivery channel.
    pub fn add_channel(&self, session_id: SessionId, sender: ConnectionSender) {
        self.channels.insert(session_id, sender);
    }

    /// Deregister a session's delivery channel. Announcements after this
    /// are silently dropped for that session.
    pub fn remove_channel(&self, session_id: SessionId) {
        self.channels.remove(&session_id);
    }

    /// Number of registered delivery channels.
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Deliver an event to every connected session. Channels whose
    /// receiver has gone away are dropped as they are discovered.
    pub fn announce(&self, event: &ServerEvent) {
        let Some(msg) = encode(event) else { return };
        self.channels.retain(|session_id, sender| {
            let delivered = sender.send(msg.clone()).is_ok();
            if !delivered {
                tracing::debug!(session_id, "Dropping closed channel during broadcast");
            }
            delivered
        });
    }

    /// Deliver an event to a single session, if its channel is still
    /// registered.
    pub fn send_to(&self, session_id: SessionId, event: &ServerEvent) {
        let Some(msg) = encode(event) else { return };
        let closed = match self.channels.get(&session_id) {
            Some(sender) => sender.send(msg).is_err(),
            None => false,
        };
        if closed {
            tracing::debug!(session_id, "Dropping closed channel after failed send");
            self.channels.remove(&session_id);
        }
    }

    /// Delivery entry point for externally sourced signals (the file
    /// watcher). Identical semantics to `announce`; the producer never
    /// needs to know about sessions.
    pub fn relay_external(&self, event: &ServerEvent) {
        self.announce(event);
    }
}

fn encode(event: &ServerEvent) -> Option<Message> {
    match serde_json::to_string(event) {
        Ok(json) => Some(Message::Text(json.into())),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to encode server event");
            None
        }
    }
}
