//! CLI module for Keydeck
//!
//! Provides subcommands for managing API keys:
//! - `list`, `create`, `update`, `delete`, `copy`: key lifecycle
//! - `validate`: look up a presented key
//! - `watch`: live table with periodic usage sync

pub mod keys;
pub mod output;
pub mod watch;

use clap::{Args, Parser, Subcommand};

use crate::config::{AppConfig, StoreBackend};
use crate::domain::{DomainError, KeyType};
use crate::infrastructure::logging;
use crate::AppState;

/// Keydeck - API key lifecycle manager
#[derive(Parser)]
#[command(name = "keydeck")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// List API keys, newest first
    List(ListArgs),

    /// Create a new API key
    Create(CreateArgs),

    /// Edit an existing API key
    Update(UpdateArgs),

    /// Delete an API key
    Delete {
        /// Key id
        id: String,
    },

    /// Copy an API key to the clipboard
    Copy {
        /// Key id
        id: String,
    },

    /// Check whether a key string is known
    Validate {
        /// Full key string
        key: String,
    },

    /// Show a live table while usage is synced periodically
    Watch(ListArgs),
}

#[derive(Args, Debug, Clone, Default)]
pub struct ListArgs {
    /// Show full keys instead of masked ones
    #[arg(long)]
    pub reveal: bool,
}

#[derive(Args, Debug, Clone)]
pub struct CreateArgs {
    /// Display name
    #[arg(long)]
    pub name: String,

    /// Environment: dev or prod
    #[arg(long = "type", default_value = "dev")]
    pub key_type: KeyType,

    /// Monthly request limit
    #[arg(long)]
    pub limit: Option<u64>,
}

#[derive(Args, Debug, Clone)]
pub struct UpdateArgs {
    /// Key id
    pub id: String,

    #[arg(long)]
    pub name: Option<String>,

    #[arg(long = "type")]
    pub key_type: Option<KeyType>,

    /// Set a monthly request limit
    #[arg(long, conflicts_with = "no_limit")]
    pub limit: Option<u64>,

    /// Remove the monthly request limit
    #[arg(long)]
    pub no_limit: bool,

    /// Overwrite the usage counter
    #[arg(long)]
    pub usage: Option<u64>,
}

/// Load configuration, start logging and wire the services
pub async fn bootstrap() -> anyhow::Result<(AppConfig, AppState)> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    logging::init_logging(&config.logging);

    let state = crate::create_app_state_with_config(&config).await?;
    Ok((config, state))
}

/// Like `bootstrap`, for commands whose effect must outlive the process
pub async fn bootstrap_persistent() -> anyhow::Result<(AppConfig, AppState)> {
    let (config, state) = bootstrap().await?;
    ensure_persistent_store(&config)?;
    Ok((config, state))
}

/// The memory backend starts empty on every run
pub fn ensure_persistent_store(config: &AppConfig) -> Result<(), DomainError> {
    match config.store.backend {
        StoreBackend::Rest => Ok(()),
        StoreBackend::Memory => Err(DomainError::configuration(
            "the memory store does not persist between commands; set store.backend = \"rest\" \
             with store.url and store.anon_key (only `watch` runs against memory)",
        )),
    }
}
