//! Session multiplexer for the streamable HTTP transport.
//!
//! Binds the stateless request/response channel to long-lived
//! per-client sessions. A session moves absent → active (on
//! initialization) → terminated (on explicit close); terminated ids
//! are forgotten and never resurrected.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, Mutex, RwLock};

/// One active client session.
///
/// The session exclusively owns its outbound event channel (the
/// transport handle bound at creation) and serializes logical
/// request/response exchanges through `exchange`.
pub struct Session {
    id: String,
    created_at: DateTime<Utc>,
    outbound: mpsc::UnboundedSender<serde_json::Value>,
    /// Taken by the first event stream opened on this session.
    receiver: Mutex<Option<mpsc::UnboundedReceiver<serde_json::Value>>>,
    /// One request/response exchange at a time per session.
    exchange: Mutex<()>,
}

impl Session {
    fn new(id: String) -> Arc<Self> {
        let (outbound, receiver) = mpsc::unbounded_channel();
        Arc::new(Self {
            id,
            created_at: Utc::now(),
            outbound,
            receiver: Mutex::new(Some(receiver)),
            exchange: Mutex::new(()),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Queue a server→client event. Silently dropped once the stream
    /// side is gone; events are best-effort.
    pub fn send_event(&self, event: serde_json::Value) {
        let _ = self.outbound.send(event);
    }

    /// Take the event stream receiver. Only the first caller gets it;
    /// the channel is exclusively owned by one stream.
    pub async fn take_event_stream(
        &self,
    ) -> Option<mpsc::UnboundedReceiver<serde_json::Value>> {
        self.receiver.lock().await.take()
    }

    /// Serialize one logical exchange on this session.
    pub async fn begin_exchange(&self) -> tokio::sync::MutexGuard<'_, ()> {
        self.exchange.lock().await
    }
}

/// Process-scoped concurrent registry of active sessions.
///
/// Injected into the transport layer explicitly; insert, lookup, and
/// delete are atomic with respect to concurrent requests.
#[derive(Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<String, Arc<Session>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create and register a session under a freshly generated id.
    ///
    /// Ids are server-generated; two initializations can never share
    /// one id.
    pub async fn create(&self) -> Arc<Session> {
        let mut sessions = self.sessions.write().await;
        let id = loop {
            let candidate = uuid::Uuid::new_v4().to_string();
            if !sessions.contains_key(&candidate) {
                break candidate;
            }
        };
        let session = Session::new(id.clone());
        sessions.insert(id, session.clone());
        session
    }

    /// Look up an active session.
    pub async fn get(&self, id: &str) -> Option<Arc<Session>> {
        self.sessions.read().await.get(id).cloned()
    }

    /// Terminate a session, releasing its owned transport. Returns
    /// false when the id is unknown or already terminated.
    pub async fn remove(&self, id: &str) -> bool {
        self.sessions.write().await.remove(id).is_some()
    }

    /// Number of active sessions.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_produces_fresh_ids() {
        let registry = SessionRegistry::new();
        let a = registry.create().await;
        let b = registry.create().await;
        assert_ne!(a.id(), b.id());
        assert_eq!(registry.len().await, 2);
    }

    #[tokio::test]
    async fn test_lookup_routes_to_same_session() {
        let registry = SessionRegistry::new();
        let session = registry.create().await;
        let found = registry.get(session.id()).await.unwrap();
        assert!(Arc::ptr_eq(&session, &found));
    }

    #[tokio::test]
    async fn test_terminated_session_not_resurrected() {
        let registry = SessionRegistry::new();
        let session = registry.create().await;
        let id = session.id().to_string();

        assert!(registry.remove(&id).await);
        assert!(registry.get(&id).await.is_none());
        // Idempotent: a second close reports not-found, never panics.
        assert!(!registry.remove(&id).await);
    }

    #[tokio::test]
    async fn test_unknown_id_not_found() {
        let registry = SessionRegistry::new();
        assert!(registry.get("never-seen").await.is_none());
        assert!(!registry.remove("never-seen").await);
    }

    #[tokio::test]
    async fn test_event_stream_exclusively_owned() {
        let registry = SessionRegistry::new();
        let session = registry.create().await;

        session.send_event(serde_json::json!({"n": 1}));
        let mut rx = session.take_event_stream().await.unwrap();
        assert!(session.take_event_stream().await.is_none());

        let event = rx.recv().await.unwrap();
        assert_eq!(event["n"], 1);
    }

    #[tokio::test]
    async fn test_concurrent_creation() {
        let registry = Arc::new(SessionRegistry::new());
        let mut handles = Vec::new();
        for _ in 0..16 {
            let registry = registry.clone();
            handles.push(tokio::spawn(async move {
                registry.create().await.id().to_string()
            }));
        }

        let mut ids = std::collections::HashSet::new();
        for handle in handles {
            ids.insert(handle.await.unwrap());
        }
        assert_eq!(ids.len(), 16);
        assert_eq!(registry.len().await, 16);
    }
}
