//! Application configuration

mod app_config;

pub use app_config::{
    AppConfig, ClipboardConfig, KeysConfig, LogFormat, LoggingConfig, SessionConfig, StoreBackend,
    StoreConfig, UsageConfig, UsageMode,
};
