//! Key lifecycle commands

use anyhow::{anyhow, bail};

use crate::cli::output::render_table;
use crate::cli::{bootstrap_persistent, CreateArgs, ListArgs, UpdateArgs};
use crate::domain::{ApiKeyId, ApiKeyRecord};
use crate::infrastructure::api_key::KeyLifecycleManager;

/// Print the key table
pub async fn list(args: ListArgs) -> anyhow::Result<()> {
    let (_, state) = bootstrap_persistent().await?;

    state.manager.refresh().await?;
    print!("{}", render_table(&state.manager, args.reveal).await);

    Ok(())
}

/// Create a key and print it once in full
pub async fn create(args: CreateArgs) -> anyhow::Result<()> {
    let (_, state) = bootstrap_persistent().await?;
    let manager = &state.manager;

    manager.begin_create().await;
    manager
        .update_draft(|draft| {
            draft.name = args.name;
            draft.key_type = args.key_type;
            if let Some(limit) = args.limit {
                draft.set_limit_enabled(true);
                draft.limits = Some(limit);
            }
        })
        .await;

    let record = manager.submit().await?;

    println!("Created API key '{}' ({})", record.name(), record.id());
    println!("  {}", record.key());
    println!(
        "  {} tier, {} requests/minute",
        record.key_type().label(),
        record.key_type().rate_limit_per_minute()
    );

    Ok(())
}

/// Edit the given fields of a key, keeping the rest
pub async fn update(args: UpdateArgs) -> anyhow::Result<()> {
    let (_, state) = bootstrap_persistent().await?;
    let manager = &state.manager;

    let existing = find(manager, &args.id).await?;
    manager.begin_edit(&existing).await;
    manager
        .update_draft(|draft| {
            if let Some(name) = args.name {
                draft.name = name;
            }
            if let Some(key_type) = args.key_type {
                draft.key_type = key_type;
            }
            if let Some(limit) = args.limit {
                draft.set_limit_enabled(true);
                draft.limits = Some(limit);
            }
            if args.no_limit {
                draft.set_limit_enabled(false);
            }
            if let Some(usage) = args.usage {
                draft.usage = usage;
            }
        })
        .await;

    let record = manager.submit().await?;
    println!("Updated API key '{}' ({})", record.name(), record.id());

    Ok(())
}

pub async fn delete(id: String) -> anyhow::Result<()> {
    let (_, state) = bootstrap_persistent().await?;

    state.manager.remove(&ApiKeyId::new(id.as_str())).await?;
    println!("Deleted API key {}", id);

    Ok(())
}

pub async fn copy(id: String) -> anyhow::Result<()> {
    let (_, state) = bootstrap_persistent().await?;

    let record = find(&state.manager, &id).await?;
    state.manager.copy(record.key()).await?;
    println!("Copied API key '{}' to the clipboard", record.name());

    Ok(())
}

/// Exit non-zero when the key is unknown
pub async fn validate(key: String) -> anyhow::Result<()> {
    let (_, state) = bootstrap_persistent().await?;

    match state.validator.validate(&key).await? {
        Some(summary) => {
            println!("{}", serde_json::to_string_pretty(&summary)?);
            Ok(())
        }
        None => bail!("Invalid API key"),
    }
}

async fn find(manager: &KeyLifecycleManager, id: &str) -> anyhow::Result<ApiKeyRecord> {
    manager.refresh().await?;
    manager
        .find(&ApiKeyId::new(id))
        .await
        .ok_or_else(|| anyhow!("API key not found: {}", id))
}
