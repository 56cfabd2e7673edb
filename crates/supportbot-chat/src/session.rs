//! Session registry: conversations keyed by ID with an idle timeout.
//!
//! Each conversation lives in the store for its whole lifetime behind its
//! own async mutex. Requests for the same session queue on that mutex; the
//! registry lock itself is only held for map lookups and never across an
//! `.await`.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use uuid::Uuid;

use crate::conversation::Conversation;

/// Default idle timeout in minutes.
pub const DEFAULT_SESSION_TIMEOUT_MINUTES: u32 = 30;

/// A stored conversation, shared by every request of one session.
pub type SharedConversation = Arc<tokio::sync::Mutex<Conversation>>;

/// In-memory store of active conversations.
#[derive(Debug)]
pub struct SessionStore {
    sessions: Mutex<HashMap<Uuid, SharedConversation>>,
    timeout_minutes: u32,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(DEFAULT_SESSION_TIMEOUT_MINUTES)
    }
}

impl SessionStore {
    pub fn new(timeout_minutes: u32) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            timeout_minutes,
        }
    }

    pub fn timeout_minutes(&self) -> u32 {
        self.timeout_minutes
    }

    /// Conversation for `requested`, left in the store.
    ///
    /// Unknown or expired IDs (and `None`) start a new conversation, which
    /// is registered immediately. Creating one also evicts every other
    /// expired conversation.
    pub fn checkout(&self, requested: Option<Uuid>) -> SharedConversation {
        let mut sessions = self.lock();

        if let Some(id) = requested {
            if let Some(shared) = sessions.get(&id) {
                if !is_expired(shared, self.timeout_minutes) {
                    return Arc::clone(shared);
                }
                tracing::debug!(session = %id, "Session expired, starting a new one");
            }
        }

        let evicted = purge(&mut sessions, self.timeout_minutes);
        if evicted > 0 {
            tracing::debug!(evicted, "Expired sessions evicted");
        }

        let conv = Conversation::new();
        let id = conv.id;
        let shared = Arc::new(tokio::sync::Mutex::new(conv));
        sessions.insert(id, Arc::clone(&shared));
        tracing::debug!(session = %id, "Session created");
        shared
    }

    /// Store `conv` under its ID, replacing any previous conversation.
    pub fn checkin(&self, conv: Conversation) -> SharedConversation {
        let id = conv.id;
        let shared = Arc::new(tokio::sync::Mutex::new(conv));
        self.lock().insert(id, Arc::clone(&shared));
        shared
    }

    /// Stored conversation, if any.
    pub fn get(&self, id: Uuid) -> Option<SharedConversation> {
        self.lock().get(&id).cloned()
    }

    /// Remove a conversation. Returns whether it existed.
    pub fn remove(&self, id: Uuid) -> bool {
        self.lock().remove(&id).is_some()
    }

    /// Drop every expired conversation. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        purge(&mut self.lock(), self.timeout_minutes)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Uuid, SharedConversation>> {
        match self.sessions.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                tracing::error!("Session lock poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }
}

// A conversation locked by a request is in use and never expired.
fn is_expired(shared: &SharedConversation, timeout_minutes: u32) -> bool {
    match shared.try_lock() {
        Ok(conv) => conv.is_expired(timeout_minutes),
        Err(_) => false,
    }
}

fn purge(sessions: &mut HashMap<Uuid, SharedConversation>, timeout_minutes: u32) -> usize {
    let before = sessions.len();
    sessions.retain(|_, shared| !is_expired(shared, timeout_minutes));
    before - sessions.len()
}
