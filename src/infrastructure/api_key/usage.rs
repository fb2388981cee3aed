//! Usage sources and the periodic usage sync loop

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::domain::api_key::ApiKeyRecord;
use crate::domain::Session;

use super::manager::KeyLifecycleManager;

pub const DEFAULT_USAGE_INTERVAL: Duration = Duration::from_secs(5);
pub const DEFAULT_MAX_SIMULATED_USAGE: u64 = 1_000;

/// Where per-key usage numbers come from
pub trait UsageSource: Send + Sync {
    /// Usage to write for a key; `None` leaves the key untouched
    fn next_usage(&self, record: &ApiKeyRecord) -> Option<u64>;

    fn name(&self) -> &'static str;
}

/// Random usage for demos
#[derive(Debug, Clone, Copy)]
pub struct SimulatedUsage {
    max: u64,
}

impl SimulatedUsage {
    /// Values are drawn uniformly from `0..max`
    pub fn new(max: u64) -> Self {
        Self { max: max.max(1) }
    }

    pub fn max(&self) -> u64 {
        self.max
    }
}

impl Default for SimulatedUsage {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SIMULATED_USAGE)
    }
}

impl UsageSource for SimulatedUsage {
    fn next_usage(&self, _record: &ApiKeyRecord) -> Option<u64> {
        Some(rand::thread_rng().gen_range(0..self.max))
    }

    fn name(&self) -> &'static str {
        "simulated"
    }
}

/// Usage is metered by the backend; the client only reads it
#[derive(Debug, Clone, Copy, Default)]
pub struct MeteredUsage;

impl UsageSource for MeteredUsage {
    fn next_usage(&self, _record: &ApiKeyRecord) -> Option<u64> {
        None
    }

    fn name(&self) -> &'static str {
        "metered"
    }
}

/// Outcome of one usage sync pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UsageSyncReport {
    pub attempted: usize,
    pub failed: usize,
    pub refreshed: bool,
}

/// Background loop that calls `sync_usage` on a fixed interval
pub struct UsageSimulator {
    manager: Arc<KeyLifecycleManager>,
    interval: Duration,
    session: Option<watch::Receiver<Option<Session>>>,
}

impl UsageSimulator {
    pub fn new(manager: Arc<KeyLifecycleManager>, interval: Duration) -> Self {
        Self {
            manager,
            interval,
            session: None,
        }
    }

    /// Stop once the session is cleared
    pub fn with_session(mut self, session: watch::Receiver<Option<Session>>) -> Self {
        self.session = Some(session);
        self
    }

    /// Start the loop on the current runtime
    pub fn spawn(self) -> UsageSimulatorHandle {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(self.run(shutdown_rx));
        UsageSimulatorHandle {
            shutdown: shutdown_tx,
            task,
        }
    }

    /// Run until shutdown is signalled or the session ends
    ///
    /// The first sync happens one full interval after start.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let Self {
            manager,
            interval,
            mut session,
        } = self;

        let mut ticker = interval_at(Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(interval_secs = interval.as_secs_f64(), "Usage simulator started");

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let report = manager.sync_usage().await;
                    debug!(
                        attempted = report.attempted,
                        failed = report.failed,
                        "Usage tick"
                    );
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!("Usage simulator shutting down");
                        break;
                    }
                }
                signed_out = session_ended(&mut session) => {
                    if signed_out {
                        info!("Session ended, stopping usage simulator");
                        break;
                    }
                }
            }
        }
    }
}

/// Resolves on each session change; `true` when the session is gone
async fn session_ended(session: &mut Option<watch::Receiver<Option<Session>>>) -> bool {
    match session {
        Some(receiver) => {
            if receiver.changed().await.is_err() {
                // Provider dropped; the last session stays in effect
                std::future::pending::<()>().await;
            }
            receiver.borrow().is_none()
        }
        None => std::future::pending().await,
    }
}

/// Handle to a spawned simulator
#[derive(Debug)]
pub struct UsageSimulatorHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl UsageSimulatorHandle {
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Signal the loop and wait for it to exit
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        if let Err(e) = self.task.await {
            warn!(error = %e, "Usage simulator task failed");
        }
    }
}
