//! Notification sink that writes to the log

use tracing::{error, info};

use crate::domain::{NotificationKind, Notifier};

/// Notifier that emits notifications as log events
#[derive(Debug, Clone, Default)]
pub struct TracingNotifier;

impl TracingNotifier {
    pub fn new() -> Self {
        Self
    }
}

impl Notifier for TracingNotifier {
    fn notify(&self, kind: NotificationKind, message: &str) {
        match kind {
            NotificationKind::Success => info!(target: "keydeck::notify", %kind, "{}", message),
            NotificationKind::Error => error!(target: "keydeck::notify", %kind, "{}", message),
        }
    }
}
