//! Application state shared across handlers.

use std::sync::Arc;

use sessiond_store::SessionStore;

/// Application state shared across all handlers.
///
/// Deliberately thin: the store is the only collaborator, and it is
/// stateless between calls, so handlers share nothing else.
#[derive(Clone)]
pub struct AppState {
    /// The session store.
    pub store: Arc<SessionStore>,
}

impl AppState {
    /// Create a new application state over a store.
    pub fn new(store: SessionStore) -> Self {
        Self {
            store: Arc::new(store),
        }
    }
}
