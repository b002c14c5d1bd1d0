//! Process-wide auth session state.

use std::sync::{Arc, RwLock};

/// Holds the bearer token for the current login session.
///
/// Set at login, read by the transport on every request, cleared at logout.
/// Cloning shares the underlying state, so the handle given to the transport
/// observes later logins.
#[derive(Debug, Clone, Default)]
pub struct Session {
    token: Arc<RwLock<Option<String>>>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the token obtained from the login endpoint.
    pub fn set_token(&self, token: impl Into<String>) {
        *self.token.write().expect("session lock poisoned") = Some(token.into());
    }

    /// Clear the token at logout.
    pub fn clear(&self) {
        *self.token.write().expect("session lock poisoned") = None;
    }

    /// The current token, if logged in.
    pub fn token(&self) -> Option<String> {
        self.token.read().expect("session lock poisoned").clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.read().expect("session lock poisoned").is_some()
    }
}
