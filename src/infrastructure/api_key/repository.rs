//! In-memory API key store implementation

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::api_key::{ApiKeyChanges, ApiKeyId, ApiKeyRecord, ApiKeyStore, NewApiKey};
use crate::domain::DomainError;

/// Process-local implementation of ApiKeyStore
///
/// Assigns uuid ids and creation timestamps the way the hosted store does.
#[derive(Debug, Clone, Default)]
pub struct InMemoryApiKeyStore {
    rows: Arc<RwLock<Vec<ApiKeyRecord>>>,
}

impl InMemoryApiKeyStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store with initial rows
    pub fn with_records(records: Vec<ApiKeyRecord>) -> Self {
        Self {
            rows: Arc::new(RwLock::new(records)),
        }
    }

    /// Number of stored rows
    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }
}

#[async_trait]
impl ApiKeyStore for InMemoryApiKeyStore {
    async fn list(&self) -> Result<Vec<ApiKeyRecord>, DomainError> {
        let rows = self.rows.read().await;

        // Later inserts win ties on created_at
        let mut result: Vec<ApiKeyRecord> = rows.iter().rev().cloned().collect();
        result.sort_by(|a, b| b.created_at().cmp(&a.created_at()));

        Ok(result)
    }

    async fn create(&self, new_key: NewApiKey) -> Result<ApiKeyRecord, DomainError> {
        let record = ApiKeyRecord::new(
            Uuid::new_v4().to_string(),
            new_key.name,
            new_key.key,
            new_key.key_type,
            Utc::now(),
        )
        .with_usage(new_key.usage)
        .with_limits(new_key.limits);

        self.rows.write().await.push(record.clone());

        Ok(record)
    }

    async fn update(
        &self,
        id: &ApiKeyId,
        changes: ApiKeyChanges,
    ) -> Result<ApiKeyRecord, DomainError> {
        let mut rows = self.rows.write().await;

        let row = rows
            .iter_mut()
            .find(|r| r.id() == id)
            .ok_or_else(|| DomainError::store("No data returned from update"))?;

        row.apply(&changes);
        Ok(row.clone())
    }

    async fn delete(&self, id: &ApiKeyId) -> Result<(), DomainError> {
        self.rows.write().await.retain(|r| r.id() != id);
        Ok(())
    }

    async fn set_usage(&self, id: &ApiKeyId, usage: u64) -> Result<(), DomainError> {
        self.update(id, ApiKeyChanges::new().with_usage(usage))
            .await
            .map(|_| ())
    }

    async fn find_by_key(&self, key: &str) -> Result<Option<ApiKeyRecord>, DomainError> {
        let rows = self.rows.read().await;
        Ok(rows.iter().find(|r| r.key() == key).cloned())
    }
}
