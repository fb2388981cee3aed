//! API key infrastructure implementations
//!
//! Key generation and redaction, the store clients, the lifecycle manager
//! and the usage sync loop.

mod generator;
mod manager;
mod redaction;
mod repository;
mod rest_store;
mod usage;
mod validator;

pub use generator::{ApiKeyGenerator, DEFAULT_KEY_PREFIX, DEFAULT_RANDOM_LENGTH};
pub use manager::KeyLifecycleManager;
pub use redaction::{display_key, mask_key};
pub use repository::InMemoryApiKeyStore;
pub use rest_store::{RestApiKeyStore, DEFAULT_TABLE};
pub use usage::{
    MeteredUsage, SimulatedUsage, UsageSimulator, UsageSimulatorHandle, UsageSource,
    UsageSyncReport, DEFAULT_MAX_SIMULATED_USAGE, DEFAULT_USAGE_INTERVAL,
};
pub use validator::KeyValidator;
