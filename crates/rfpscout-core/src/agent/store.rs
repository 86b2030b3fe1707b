//! Per-thread chat sessions

use crate::llm::ChatSession;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Session shared between requests of one thread; its lock serializes turns
pub type SharedSession = Arc<Mutex<ChatSession>>;

/// Map of thread id to session with atomic get-or-create
///
/// Sessions are never evicted on their own; callers end them with
/// [`SessionStore::remove`] or [`SessionStore::clear`].
#[derive(Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<String, SharedSession>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, thread_id: &str) -> Option<SharedSession> {
        self.sessions.lock().await.get(thread_id).cloned()
    }

    /// Existing session for `thread_id`, or one built by `create`
    ///
    /// Returns `true` alongside the session when it was created by this call.
    /// Concurrent callers for the same new thread id all receive the same session.
    pub async fn get_or_create<F>(&self, thread_id: &str, create: F) -> (SharedSession, bool)
    where
        F: FnOnce() -> ChatSession,
    {
        let mut sessions = self.sessions.lock().await;
        if let Some(existing) = sessions.get(thread_id) {
            return (Arc::clone(existing), false);
        }
        let session = Arc::new(Mutex::new(create()));
        sessions.insert(thread_id.to_string(), Arc::clone(&session));
        (session, true)
    }

    pub async fn remove(&self, thread_id: &str) -> bool {
        self.sessions.lock().await.remove(thread_id).is_some()
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn clear(&self) {
        self.sessions.lock().await.clear();
    }
}
