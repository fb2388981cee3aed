//! API Key domain
//!
//! This module provides the API key record, the transient form state the
//! dashboard edits, and the store trait the records are persisted through.

mod draft;
mod entity;
mod store;
mod validation;

pub use draft::{DraftForm, ModalState, DEFAULT_MONTHLY_LIMIT};
pub use entity::{ApiKeyChanges, ApiKeyId, ApiKeyRecord, ApiKeySummary, KeyType, NewApiKey};
#[cfg(test)]
pub use store::MockApiKeyStore;
pub use store::ApiKeyStore;
pub use validation::{validate_key_name, ApiKeyValidationError};
