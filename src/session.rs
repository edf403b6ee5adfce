//! In-memory session registry.
//!
//! Tracks every live WebSocket connection. Sessions are never persisted;
//! the registry exists so the server can answer online-count queries and
//! keep per-connection metadata (address, client descriptor, activity).
//! A user with two tabs open holds two sessions sharing one identity.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;

/// Process-unique id for one live connection.
pub type SessionId = u64;

/// One live transport connection.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: SessionId,
    pub identity: String,
    pub remote_addr: SocketAddr,
    pub client_descriptor: String,
    pub connected_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
}

/// Registry of live sessions (DashMap for concurrent access).
/// The online count is derived from the map itself so concurrent
/// connects and disconnects cannot skew it.
#[derive(Clone, Default)]
pub struct SessionRegistry {
    sessions: Arc<DashMap<SessionId, Session>>,
    next_id: Arc<AtomicU64>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create and store a session for a freshly established connection.
    /// Returns a clone for the caller to push initial state with.
    pub fn register(
        &self,
        identity: String,
        remote_addr: SocketAddr,
        client_descriptor: String,
    ) -> Session {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let now = Utc::now();
        let session = Session {
            id,
            identity,
            remote_addr,
            client_descriptor,
            connected_at: now,
            last_activity: now,
        };
        self.sessions.insert(id, session.clone());

        tracing::debug!(
            session_id = id,
            identity = %session.identity,
            online = self.count(),
            "Session registered"
        );
        session
    }

    /// Refresh a session's last-activity timestamp.
    /// No-op if the session is already gone — a keep-alive racing a
    /// disconnect is not an error.
    pub fn touch(&self, session_id: SessionId) {
        if let Some(mut session) = self.sessions.get_mut(&session_id) {
            session.last_activity = Utc::now();
        }
    }

    /// Delete and return the session, if it is still present.
    pub fn remove(&self, session_id: SessionId) -> Option<Session> {
        let removed = self.sessions.remove(&session_id).map(|(_, s)| s);
        if let Some(session) = &removed {
            tracing::debug!(
                session_id,
                identity = %session.identity,
                online = self.count(),
                "Session removed"
            );
        }
        removed
    }

    /// Number of currently registered sessions.
    pub fn count(&self) -> usize {
        self.sessions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr() -> SocketAddr {
        "127.0.0.1:9999".parse().unwrap()
    }

    fn register(registry: &SessionRegistry, identity: &str) -> Session {
        registry.register(identity.to_string(), addr(), "test-agent".to_string())
    }

    #[test]
    fn count_tracks_connects_and_disconnects() {
        let registry = SessionRegistry::new();

        let a = register(&registry, "u1");
        let b = register(&registry, "u2");
        let c = register(&registry, "u1");
        assert_eq!(registry.count(), 3);

        assert!(registry.remove(b.id).is_some());
        assert_eq!(registry.count(), 2);

        assert!(registry.remove(a.id).is_some());
        assert!(registry.remove(c.id).is_some());
        assert_eq!(registry.count(), 0);
    }

    #[test]
    fn session_ids_are_unique() {
        let registry = SessionRegistry::new();
        let a = register(&registry, "u1");
        let b = register(&registry, "u1");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn remove_is_idempotent() {
        let registry = SessionRegistry::new();
        let session = register(&registry, "u1");

        assert!(registry.remove(session.id).is_some());
        assert!(registry.remove(session.id).is_none());
        assert_eq!(registry.count(), 0);
    }

    #[test]
    fn touch_refreshes_last_activity() {
        let registry = SessionRegistry::new();
        let session = register(&registry, "u1");

        std::thread::sleep(std::time::Duration::from_millis(5));
        registry.touch(session.id);

        let touched = registry.remove(session.id).unwrap();
        assert!(touched.last_activity > session.last_activity);
    }

    #[test]
    fn touch_after_remove_is_a_noop() {
        let registry = SessionRegistry::new();
        let session = register(&registry, "u1");
        registry.remove(session.id);

        // Must not panic or resurrect the session.
        registry.touch(session.id);
        assert_eq!(registry.count(), 0);
    }
}
