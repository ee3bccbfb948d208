//! Periodic pull of the remote task table into the local store.
//!
//! One poll at a time: the next tick is not taken until the previous fetch
//! has been merged, and missed ticks are skipped rather than bunched.
//! Only a successful fetch touches local state.

use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::store::{LocalTaskStore, ReconcileSummary};
use crate::sync::client::SnapshotOutcome;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone)]
pub struct ReconciliationLoop {
    store: LocalTaskStore,
    interval: Duration,
}

impl ReconciliationLoop {
    pub fn new(store: LocalTaskStore) -> Self {
        Self {
            store,
            interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval.max(Duration::from_millis(1));
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Run one fetch-and-merge. `None` when nothing was applied.
    pub async fn tick(&self) -> Option<ReconcileSummary> {
        match self.store.remote().fetch_snapshot().await {
            SnapshotOutcome::Fetched(rows) => {
                let summary = self.store.apply_remote_snapshot(rows);
                if summary.changed {
                    debug!(
                        remote_rows = summary.remote_rows,
                        kept_local = summary.kept_local,
                        "applied remote snapshot"
                    );
                }
                Some(summary)
            }
            SnapshotOutcome::Failed(reason) => {
                debug!(%reason, "poll failed; keeping local state");
                None
            }
            SnapshotOutcome::Unconfigured => None,
        }
    }

    /// Spawn the polling task. The first poll runs immediately.
    pub fn start(self) -> ReconcileHandle {
        let (stop_tx, mut stop_rx) = oneshot::channel();
        let period = self.interval;

        let join = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            info!(interval_ms = period.as_millis() as u64, "reconciliation started");

            loop {
                tokio::select! {
                    _ = &mut stop_rx => break,
                    _ = ticker.tick() => {
                        self.tick().await;
                    }
                }
            }
            info!("reconciliation stopped");
        });

        ReconcileHandle {
            stop: Some(stop_tx),
            join: Some(join),
        }
    }
}

/// Owner of a running reconciliation task. Dropping it aborts the task.
#[derive(Debug)]
pub struct ReconcileHandle {
    stop: Option<oneshot::Sender<()>>,
    join: Option<JoinHandle<()>>,
}

impl ReconcileHandle {
    pub fn is_running(&self) -> bool {
        self.join.as_ref().is_some_and(|join| !join.is_finished())
    }

    /// Ask the loop to exit and wait for it. An in-flight poll finishes first.
    pub async fn stop(mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        if let Some(join) = self.join.take() {
            if let Err(e) = join.await {
                debug!(error = %e, "reconciliation task ended abnormally");
            }
        }
    }
}

impl Drop for ReconcileHandle {
    fn drop(&mut self) {
        if let Some(join) = &self.join {
            join.abort();
        }
    }
}
