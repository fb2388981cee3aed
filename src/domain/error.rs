use thiserror::Error;

/// Core domain errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Store error: {message}")]
    Store { message: String },

    #[error("Clipboard error: {message}")]
    Clipboard { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Not signed in: {message}")]
    Unauthenticated { message: String },
}

impl DomainError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn store(message: impl Into<String>) -> Self {
        Self::Store {
            message: message.into(),
        }
    }

    pub fn clipboard(message: impl Into<String>) -> Self {
        Self::Clipboard {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::Unauthenticated {
            message: message.into(),
        }
    }

    /// The bare message, without the category prefix
    ///
    /// Notifications show this text to the user.
    pub fn message(&self) -> &str {
        match self {
            Self::Validation { message }
            | Self::Store { message }
            | Self::Clipboard { message }
            | Self::Configuration { message }
            | Self::Unauthenticated { message } => message,
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    pub fn is_store(&self) -> bool {
        matches!(self, Self::Store { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error() {
        let error = DomainError::validation("Name is required");
        assert_eq!(error.to_string(), "Validation error: Name is required");
        assert!(error.is_validation());
    }

    #[test]
    fn test_store_error() {
        let error = DomainError::store("No data returned from insert");
        assert_eq!(error.to_string(), "Store error: No data returned from insert");
        assert!(error.is_store());
    }

    #[test]
    fn test_message_strips_category() {
        let error = DomainError::clipboard("clipboard unavailable");
        assert_eq!(error.message(), "clipboard unavailable");
    }
}
