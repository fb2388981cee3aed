//! Identity provider boundary
//!
//! Sign-in itself happens elsewhere; the dashboard only asks whether a session
//! exists and listens for it to change.

use async_trait::async_trait;
use tokio::sync::watch;

/// An authenticated session issued by the identity provider
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: String,
    pub access_token: String,
}

impl Session {
    pub fn new(user_id: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            access_token: access_token.into(),
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("user_id", &self.user_id)
            .field("access_token", &"[redacted]")
            .finish()
    }
}

/// Source of the current session
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// The active session, if any
    async fn current_session(&self) -> Option<Session>;

    /// Stream of session changes; `None` means signed out
    fn subscribe(&self) -> watch::Receiver<Option<Session>>;
}
