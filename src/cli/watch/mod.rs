//! Watch command - live key table with periodic usage sync

use std::time::Duration;

use tokio::signal;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::info;

use crate::cli::output::render_table;
use crate::cli::{bootstrap, ListArgs};
use crate::domain::SessionProvider;
use crate::infrastructure::api_key::UsageSimulator;

/// Run until Ctrl+C or until the session ends
pub async fn run(args: ListArgs) -> anyhow::Result<()> {
    let (config, state) = bootstrap().await?;
    let manager = state.manager.clone();

    manager.refresh().await?;
    print!("{}", render_table(&manager, args.reveal).await);

    let period = Duration::from_secs(config.usage.interval_secs.max(1));
    let simulator = UsageSimulator::new(manager.clone(), period)
        .with_session(state.session.subscribe())
        .spawn();

    // Redraw shortly after each sync so the table shows fresh numbers
    let offset = period / 2;
    let mut redraw = interval_at(Instant::now() + period + offset, period);
    redraw.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = redraw.tick() => {
                if simulator.is_finished() {
                    info!("Usage sync stopped");
                    break;
                }
                println!();
                print!("{}", render_table(&manager, args.reveal).await);
            }
            result = signal::ctrl_c() => {
                result?;
                info!("Received Ctrl+C, stopping");
                break;
            }
        }
    }

    simulator.shutdown().await;
    Ok(())
}
