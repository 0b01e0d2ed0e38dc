//! Session registry — one live `Session` per whiteboard id.
//!
//! DESIGN
//! ======
//! The registry is an owned value held by `AppState`, not a process global,
//! so tests build isolated instances. Initial content is parsed before the
//! write lock is taken, so a large load never stalls other whiteboards. The
//! insert itself rechecks under the lock: two connections racing on a new id
//! always end up sharing one session, and only the winner's content is used.
//!
//! Sessions stay registered until `close` is called. Nothing closes them
//! automatically, so an id that is never closed is held for the life of the
//! process.
//!
//! ERROR HANDLING
//! ==============
//! Initial content that fails to parse is logged and the session starts
//! empty. Creation itself cannot fail.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::services::persistence;
use crate::services::session::{Session, SessionState};

// =============================================================================
// HOOKS
// =============================================================================

/// Lifecycle callbacks. `on_create` runs under the registry write lock, so
/// hooks must not block.
pub trait SessionHooks: Send + Sync {
    fn on_create(&self, _session: &Session) {}
    fn on_close(&self, _session: &Session) {}
}

/// Default hooks: lifecycle events go to the log.
pub struct LogHooks;

impl SessionHooks for LogHooks {
    fn on_create(&self, session: &Session) {
        info!(whiteboard_id = %session.id(), "whiteboard session created");
    }

    fn on_close(&self, session: &Session) {
        info!(whiteboard_id = %session.id(), "whiteboard session closed");
    }
}

// =============================================================================
// REGISTRY
// =============================================================================

#[derive(Clone)]
pub struct SessionRegistry {
    sessions: Arc<RwLock<HashMap<String, Arc<Session>>>>,
    hooks: Arc<dyn SessionHooks>,
}

impl SessionRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::with_hooks(Arc::new(LogHooks))
    }

    #[must_use]
    pub fn with_hooks(hooks: Arc<dyn SessionHooks>) -> Self {
        Self { sessions: Arc::new(RwLock::new(HashMap::new())), hooks }
    }

    /// Return the session for `id`, creating it if needed. `initial` is saved
    /// content and is only used when this call creates the session.
    pub async fn get_or_create(&self, id: &str, initial: Option<&str>) -> Arc<Session> {
        if let Some(session) = self.sessions.read().await.get(id) {
            return Arc::clone(session);
        }

        // Parse outside the lock; a losing racer just discards its copy.
        let state = initial_state(id, initial);

        let mut sessions = self.sessions.write().await;
        if let Some(session) = sessions.get(id) {
            return Arc::clone(session);
        }

        let session = Arc::new(Session::new(id, state));
        self.hooks.on_create(&session);
        sessions.insert(id.to_owned(), Arc::clone(&session));
        session
    }

    pub async fn get(&self, id: &str) -> Option<Arc<Session>> {
        self.sessions.read().await.get(id).cloned()
    }

    /// Unregister `id` and disconnect its clients. Returns false if unknown.
    pub async fn close(&self, id: &str) -> bool {
        let removed = self.sessions.write().await.remove(id);
        let Some(session) = removed else {
            return false;
        };
        self.hooks.on_close(&session);
        session.disconnect_all().await;
        true
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

fn initial_state(id: &str, initial: Option<&str>) -> SessionState {
    match initial.filter(|content| !content.trim().is_empty()) {
        None => SessionState::new(),
        Some(content) => match persistence::parse_saved(content) {
            Ok(saved) => SessionState::hydrate(saved),
            Err(e) => {
                warn!(whiteboard_id = %id, error = %e, "initial content unreadable; starting empty");
                SessionState::new()
            }
        },
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "registry_test.rs"]
mod tests;
