//! In-memory session store.
//!
//! Written to by the pairing subsystem (settle, expire, delete) and read by
//! the dispatcher and router through [`SessionStore::lookup`].

use crate::ports::{SessionStore, SystemTimeSource, TimeSource};
use parking_lot::RwLock;
use shared_types::{Session, SessionState, Topic};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Session records keyed by topic.
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<Topic, Session>>,
    time: Arc<dyn TimeSource>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::with_time_source(Arc::new(SystemTimeSource))
    }

    pub fn with_time_source(time: Arc<dyn TimeSource>) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            time,
        }
    }

    /// Insert or replace a session record as-is.
    pub fn insert(&self, session: Session) {
        debug!(topic = %session.topic, state = ?session.state, "Storing session");
        self.sessions.write().insert(session.topic.clone(), session);
    }

    /// Insert a session in the settled state.
    pub fn settle(&self, mut session: Session) {
        session.state = SessionState::Settled;
        self.insert(session);
    }

    /// Mark a session expired. Returns false if the topic is unknown.
    pub fn expire(&self, topic: &Topic) -> bool {
        match self.sessions.write().get_mut(topic) {
            Some(session) => {
                session.state = SessionState::Expired;
                debug!(topic = %topic, "Session expired");
                true
            }
            None => false,
        }
    }

    /// Remove a session record. Returns the removed record.
    pub fn delete(&self, topic: &Topic) -> Option<Session> {
        let removed = self.sessions.write().remove(topic);
        if removed.is_some() {
            debug!(topic = %topic, "Session deleted");
        }
        removed
    }

    /// Raw record regardless of state.
    pub fn get(&self, topic: &Topic) -> Option<Session> {
        self.sessions.read().get(topic).cloned()
    }

    /// Number of records in any state.
    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore for InMemorySessionStore {
    fn lookup(&self, topic: &Topic) -> Option<Session> {
        let now = self.time.now();
        self.sessions
            .read()
            .get(topic)
            .filter(|s| s.is_settled() && !s.is_expired_at(now))
            .cloned()
    }
}
