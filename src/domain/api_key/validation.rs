//! API key form validation

use thiserror::Error;

use crate::domain::DomainError;

/// Errors raised before a draft reaches the store
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ApiKeyValidationError {
    #[error("Name is required")]
    EmptyName,
}

impl From<ApiKeyValidationError> for DomainError {
    fn from(err: ApiKeyValidationError) -> Self {
        DomainError::validation(err.to_string())
    }
}

/// Validate a key's display name
///
/// Surrounding whitespace is ignored; what remains must be non-empty. This is
/// the only check a draft goes through before it is sent to the store.
pub fn validate_key_name(name: &str) -> Result<(), ApiKeyValidationError> {
    if name.trim().is_empty() {
        return Err(ApiKeyValidationError::EmptyName);
    }

    Ok(())
}
