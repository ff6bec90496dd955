//! Refresh Scheduler
//!
//! Runs a refresh cycle on every tick of a fixed interval until shut down.
//! A failed cycle is logged and left for the next tick; cycles never
//! overlap because each tick awaits the previous cycle.

use super::engine::{CycleReport, RefreshEngine};
use crate::error::Result;
use crate::storage::KvStore;
use crate::upstream::LeaderboardSource;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, RwLock};
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

/// Counters exposed for logging and tests
#[derive(Debug, Clone, Default)]
pub struct SchedulerState {
    pub last_run_at: Option<chrono::DateTime<chrono::Utc>>,
    pub last_error: Option<String>,
    pub total_runs: u32,
    pub total_failures: u32,
}

/// Handle returned by [`RefreshScheduler::spawn`] for graceful shutdown
pub struct SchedulerHandle {
    pub task_handle: tokio::task::JoinHandle<()>,
    pub shutdown_tx: watch::Sender<bool>,
    pub state: Arc<RwLock<SchedulerState>>,
}

impl SchedulerHandle {
    /// Signal the scheduler to shut down gracefully
    pub fn shutdown(&self) {
        if let Err(e) = self.shutdown_tx.send(true) {
            warn!("Failed to send shutdown signal to refresh scheduler: {}", e);
        }
    }
}

pub struct RefreshScheduler<S, K> {
    engine: Arc<RefreshEngine<S, K>>,
    interval: Duration,
    state: Arc<RwLock<SchedulerState>>,
}

impl<S, K> RefreshScheduler<S, K>
where
    S: LeaderboardSource + 'static,
    K: KvStore + 'static,
{
    pub fn new(engine: Arc<RefreshEngine<S, K>>, interval: Duration) -> Self {
        Self {
            engine,
            interval,
            state: Arc::new(RwLock::new(SchedulerState::default())),
        }
    }

    /// Start the scheduler as a background task. The first cycle runs
    /// immediately.
    pub fn spawn(self) -> SchedulerHandle {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let state = Arc::clone(&self.state);
        let task_handle = tokio::spawn(self.run(shutdown_rx));

        SchedulerHandle {
            task_handle,
            shutdown_tx,
            state,
        }
    }

    async fn run(self, mut shutdown_rx: watch::Receiver<bool>) {
        info!(
            "Starting refresh scheduler (interval: {} seconds)",
            self.interval.as_secs()
        );

        let mut interval_timer = tokio::time::interval(self.interval);
        interval_timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = interval_timer.tick() => {
                    let _ = self.tick().await;
                }
                changed = shutdown_rx.changed() => {
                    if changed.is_err() || *shutdown_rx.borrow() {
                        info!("Refresh scheduler received shutdown signal, stopping");
                        break;
                    }
                }
            }
        }
    }

    async fn tick(&self) -> Result<CycleReport> {
        let result = self.engine.run_cycle().await;

        let mut state = self.state.write().await;
        state.last_run_at = Some(chrono::Utc::now());
        state.total_runs += 1;

        match &result {
            Ok(report) => {
                state.last_error = None;
                info!(
                    "Refresh cycle {} complete: {} half, {} runs",
                    state.total_runs,
                    report.plan.refresh,
                    report.fresh_runs + report.retained_runs
                );
            }
            Err(e) => {
                state.last_error = Some(e.to_string());
                state.total_failures += 1;
                error!(
                    "Refresh cycle failed ({} failures so far), retrying next tick: {}",
                    state.total_failures, e
                );
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::refresh::StalenessPolicy;
    use crate::storage::{MemoryStore, SnapshotStore};
    use crate::upstream::SpeedrunClient;
    use httpmock::prelude::*;

    fn scheduler(base_url: &str) -> RefreshScheduler<SpeedrunClient, Arc<MemoryStore>> {
        let client = SpeedrunClient::new(base_url, "rac4", Duration::from_secs(5)).unwrap();
        let engine = RefreshEngine::new(
            client,
            SnapshotStore::new(Arc::new(MemoryStore::new())),
            StalenessPolicy::DayOfMonth,
        );
        RefreshScheduler::new(Arc::new(engine), Duration::from_secs(3600))
    }

    #[tokio::test]
    async fn test_tick_records_failure() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/games/rac4");
            then.status(500);
        });

        let scheduler = scheduler(&server.base_url());
        assert!(scheduler.tick().await.is_err());

        let state = scheduler.state.read().await;
        assert_eq!(state.total_runs, 1);
        assert_eq!(state.total_failures, 1);
        assert!(state.last_error.as_deref().unwrap_or("").contains("500"));
    }

    #[tokio::test]
    async fn test_spawn_runs_first_cycle_and_shuts_down() {
        let server = MockServer::start();
        let catalog = server.mock(|when, then| {
            when.method(GET).path("/games/rac4");
            then.status(200).json_body(serde_json::json!({
                "data": {"levels": {"data": []}}
            }));
        });

        let handle = scheduler(&server.base_url()).spawn();

        for _ in 0..50 {
            if handle.state.read().await.total_runs > 0 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }

        handle.shutdown();
        handle.task_handle.await.unwrap();

        let state = handle.state.read().await;
        assert_eq!(state.total_runs, 1);
        assert_eq!(state.total_failures, 0);
        assert!(state.last_run_at.is_some());
        catalog.assert();
    }
}
