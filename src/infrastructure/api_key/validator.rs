//! Presented-key lookup

use std::sync::Arc;

use tracing::debug;

use crate::domain::api_key::{ApiKeyStore, ApiKeySummary};
use crate::domain::DomainError;

/// Looks up a presented key string
///
/// Matches the exact stored key. No hashing, no rate limiting.
#[derive(Clone)]
pub struct KeyValidator {
    store: Arc<dyn ApiKeyStore>,
}

impl KeyValidator {
    pub fn new(store: Arc<dyn ApiKeyStore>) -> Self {
        Self { store }
    }

    /// `Ok(None)` when the key is unknown
    pub async fn validate(&self, raw: &str) -> Result<Option<ApiKeySummary>, DomainError> {
        let key = raw.trim();
        if key.is_empty() {
            return Ok(None);
        }

        let summary = self.store.find_by_key(key).await?.map(|r| r.summary());
        debug!(valid = summary.is_some(), "API key validated");

        Ok(summary)
    }
}

impl std::fmt::Debug for KeyValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyValidator").finish_non_exhaustive()
    }
}
