//! Clipboard boundary

use async_trait::async_trait;

use crate::domain::DomainError;

#[cfg(test)]
use mockall::automock;

/// Something that can receive copied text
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Clipboard: Send + Sync {
    /// Replace the clipboard contents; failures are `DomainError::Clipboard`
    async fn write_text(&self, text: &str) -> Result<(), DomainError>;
}
