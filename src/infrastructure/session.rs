//! Session provider backed by a watch channel
//!
//! The session is handed in from outside (configuration or a sign-in flow)
//! and can be replaced or cleared at runtime.

use async_trait::async_trait;
use tokio::sync::watch;
use tracing::info;

use crate::domain::{Session, SessionProvider};

#[derive(Debug)]
pub struct StaticSessionProvider {
    sender: watch::Sender<Option<Session>>,
}

impl StaticSessionProvider {
    pub fn new(session: Option<Session>) -> Self {
        let (sender, _) = watch::channel(session);
        Self { sender }
    }

    /// Build from configured credentials; no token means signed out
    pub fn from_token(user_id: Option<String>, access_token: Option<String>) -> Self {
        let session = access_token
            .filter(|t| !t.trim().is_empty())
            .map(|token| Session::new(user_id.unwrap_or_default(), token));
        Self::new(session)
    }

    /// Replace the current session
    pub fn set_session(&self, session: Session) {
        info!(user_id = %session.user_id, "Session started");
        self.sender.send_replace(Some(session));
    }

    /// Sign out
    pub fn clear(&self) {
        info!("Session ended");
        self.sender.send_replace(None);
    }
}

impl Default for StaticSessionProvider {
    fn default() -> Self {
        Self::new(None)
    }
}

#[async_trait]
impl SessionProvider for StaticSessionProvider {
    async fn current_session(&self) -> Option<Session> {
        self.sender.borrow().clone()
    }

    fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.sender.subscribe()
    }
}
