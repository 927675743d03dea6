//! In-process session token store

use juke_core::SessionSource;
use tokio::sync::watch;
use tracing::info;

/// Watchable auth token holder.
///
/// Implements `SessionSource` for the engine, and lets the engine follow
/// sign-in/sign-out through [`SessionStore::subscribe`].
#[derive(Debug)]
pub struct SessionStore {
    token: watch::Sender<Option<String>>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    /// Create a signed-out store
    pub fn new() -> Self {
        let (token, _) = watch::channel(None);
        Self { token }
    }

    /// Create a store that is already signed in
    pub fn with_token(token: impl Into<String>) -> Self {
        let store = Self::new();
        store.sign_in(token);
        store
    }

    /// Store a token. Replacing an existing token starts a new session.
    pub fn sign_in(&self, token: impl Into<String>) {
        let token = token.into();
        if token.trim().is_empty() {
            self.sign_out();
            return;
        }
        info!("Session signed in");
        self.token.send_replace(Some(token));
    }

    /// Drop the token
    pub fn sign_out(&self) {
        if self.token.send_replace(None).is_some() {
            info!("Session signed out");
        }
    }

    /// Receiver notified on every token change
    pub fn subscribe(&self) -> watch::Receiver<Option<String>> {
        self.token.subscribe()
    }
}

impl SessionSource for SessionStore {
    fn auth_token(&self) -> Option<String> {
        self.token.borrow().clone()
    }
}
