//! API key store trait

use async_trait::async_trait;

use super::entity::{ApiKeyChanges, ApiKeyId, ApiKeyRecord, NewApiKey};
use crate::domain::DomainError;

#[cfg(test)]
use mockall::automock;

/// Remote row store holding the `api_keys` table
///
/// Every failure is reported as `DomainError::Store`. Implementations do not
/// validate names; callers do that before inserting.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ApiKeyStore: Send + Sync {
    /// All keys, newest first
    async fn list(&self) -> Result<Vec<ApiKeyRecord>, DomainError>;

    /// Insert a key and return the stored row
    async fn create(&self, new_key: NewApiKey) -> Result<ApiKeyRecord, DomainError>;

    /// Apply a partial update to one key and return the stored row
    ///
    /// Fails when no row with `id` exists.
    async fn update(
        &self,
        id: &ApiKeyId,
        changes: ApiKeyChanges,
    ) -> Result<ApiKeyRecord, DomainError>;

    /// Delete a key
    ///
    /// Succeeds whenever the backend reports no error, even if nothing matched.
    async fn delete(&self, id: &ApiKeyId) -> Result<(), DomainError>;

    /// Overwrite a key's usage counter
    async fn set_usage(&self, id: &ApiKeyId, usage: u64) -> Result<(), DomainError>;

    /// Look a key up by its exact secret
    async fn find_by_key(&self, key: &str) -> Result<Option<ApiKeyRecord>, DomainError>;
}
