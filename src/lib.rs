//! Keydeck
//!
//! API key lifecycle management for a developer dashboard:
//! - Prefixed key generation per environment (`dev`, `prod`)
//! - Masked display with per-key reveal
//! - Create, edit and delete against a hosted row store or in memory
//! - Periodic usage sync, simulated for demos or metered by the backend

pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;
use std::time::Duration;

use domain::{ApiKeyStore, Clipboard, DomainError, SessionProvider};
use infrastructure::{
    api_key::{
        ApiKeyGenerator, InMemoryApiKeyStore, KeyLifecycleManager, KeyValidator, MeteredUsage,
        RestApiKeyStore, SimulatedUsage, UsageSource,
    },
    clipboard::SystemClipboard,
    notification::TracingNotifier,
    session::StaticSessionProvider,
};
use tracing::info;

use config::{StoreBackend, UsageMode};

/// Wired services shared by the commands
#[derive(Debug, Clone)]
pub struct AppState {
    pub manager: Arc<KeyLifecycleManager>,
    pub validator: KeyValidator,
    pub session: Arc<StaticSessionProvider>,
}

/// Create the application state with default configuration
pub async fn create_app_state() -> Result<AppState, DomainError> {
    create_app_state_with_config(&AppConfig::default()).await
}

/// Create the application state with custom configuration
pub async fn create_app_state_with_config(config: &AppConfig) -> Result<AppState, DomainError> {
    let session = Arc::new(StaticSessionProvider::from_token(
        config.session.user_id.clone(),
        config.session.access_token.clone(),
    ));

    if config.session.required && session.current_session().await.is_none() {
        return Err(DomainError::unauthenticated(
            "sign in to manage API keys (set session.access_token)",
        ));
    }

    let store = create_store(config, session.clone())?;
    let clipboard = create_clipboard(config)?;

    let generator = ApiKeyGenerator::new(config.keys.prefix.clone())
        .with_random_length(config.keys.random_length);

    let manager = KeyLifecycleManager::new(store.clone(), Arc::new(TracingNotifier::new()), clipboard)
        .with_generator(generator)
        .with_usage_source(create_usage_source(config));

    Ok(AppState {
        manager: Arc::new(manager),
        validator: KeyValidator::new(store),
        session,
    })
}

fn create_store(
    config: &AppConfig,
    session: Arc<StaticSessionProvider>,
) -> Result<Arc<dyn ApiKeyStore>, DomainError> {
    match config.store.backend {
        StoreBackend::Memory => {
            info!("Using in-memory API key store");
            Ok(Arc::new(InMemoryApiKeyStore::new()))
        }
        StoreBackend::Rest => {
            let url = config
                .store
                .url
                .as_deref()
                .filter(|u| !u.trim().is_empty())
                .ok_or_else(|| DomainError::configuration("store.url is required for the rest backend"))?;
            let anon_key = config
                .store
                .anon_key
                .clone()
                .ok_or_else(|| {
                    DomainError::configuration("store.anon_key is required for the rest backend")
                })?;

            let store = RestApiKeyStore::new(
                url,
                anon_key,
                Duration::from_secs(config.store.timeout_secs),
            )?
            .with_table(&config.store.table)
            .with_session(session as Arc<dyn SessionProvider>);

            info!(endpoint = %store.endpoint(), "Using REST API key store");
            Ok(Arc::new(store))
        }
    }
}

fn create_clipboard(config: &AppConfig) -> Result<Arc<dyn Clipboard>, DomainError> {
    let clipboard = match config.clipboard.command.as_deref() {
        Some(command) => SystemClipboard::new(command)?,
        None => SystemClipboard::default(),
    };
    Ok(Arc::new(clipboard))
}

fn create_usage_source(config: &AppConfig) -> Arc<dyn UsageSource> {
    match config.usage.mode {
        UsageMode::Simulated => {
            info!(max = config.usage.max_simulated, "Simulating API key usage");
            Arc::new(SimulatedUsage::new(config.usage.max_simulated))
        }
        UsageMode::Metered => Arc::new(MeteredUsage),
    }
}
