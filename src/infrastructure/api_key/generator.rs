//! API Key generation
//!
//! Produces key material of the form `<prefix>-<type>-<random>`.

use rand::distributions::Alphanumeric;
use rand::Rng;

use crate::domain::KeyType;

/// Product prefix carried by every key
pub const DEFAULT_KEY_PREFIX: &str = "tvly";

/// Length of the random alphanumeric suffix
pub const DEFAULT_RANDOM_LENGTH: usize = 32;

/// Separator between key segments
pub const KEY_SEPARATOR: char = '-';

/// Generator for API key material
///
/// Keys are not checked for uniqueness against the store.
#[derive(Debug, Clone)]
pub struct ApiKeyGenerator {
    prefix: String,
    random_length: usize,
}

impl ApiKeyGenerator {
    /// Create a generator with a custom product prefix
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            random_length: DEFAULT_RANDOM_LENGTH,
        }
    }

    /// Set the length of the random suffix
    pub fn with_random_length(mut self, length: usize) -> Self {
        self.random_length = length;
        self
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Generate a new key for the given environment
    pub fn generate(&self, key_type: KeyType) -> String {
        let random: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(self.random_length)
            .map(char::from)
            .collect();

        self.from_secret(key_type, &random)
    }

    /// Build a key around a known random part (for testing purposes)
    pub fn from_secret(&self, key_type: KeyType, secret: &str) -> String {
        format!(
            "{}{sep}{}{sep}{}",
            self.prefix,
            key_type.as_str(),
            secret,
            sep = KEY_SEPARATOR
        )
    }

    /// Environment tag embedded in a key, when the key follows the format
    pub fn environment_of(key: &str) -> Option<KeyType> {
        let mut segments = key.splitn(3, KEY_SEPARATOR);
        let _prefix = segments.next()?;
        let tag = segments.next()?;
        segments.next()?;

        match tag {
            "dev" => Some(KeyType::Dev),
            "prod" => Some(KeyType::Prod),
            _ => None,
        }
    }
}

impl Default for ApiKeyGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_KEY_PREFIX)
    }
}
