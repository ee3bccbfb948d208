//! Fire-and-forget adapter over a `TaskBackend`.
//!
//! Every call settles: backend failures are logged at debug level and
//! reported as a tagged outcome, never as an error. Having no backend at all
//! is a valid permanent mode.

use std::fmt;
use std::sync::Arc;

use crate::storage::Config;
use crate::sync::backend::{PostgrestBackend, RestEndpoint, TaskBackend, TaskPatch};
use crate::task::Task;

/// How a remote write settled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteOutcome {
    Applied,
    Failed(String),
    /// No backend configured; nothing was attempted.
    Unconfigured,
}

impl RemoteOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, RemoteOutcome::Applied)
    }
}

impl fmt::Display for RemoteOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemoteOutcome::Applied => f.write_str("applied"),
            RemoteOutcome::Failed(reason) => write!(f, "failed ({reason})"),
            RemoteOutcome::Unconfigured => f.write_str("no remote configured"),
        }
    }
}

/// Result of reading the full remote table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotOutcome {
    Fetched(Vec<Task>),
    Failed(String),
    Unconfigured,
}

#[derive(Clone, Default)]
pub struct RemoteSyncClient {
    backend: Option<Arc<dyn TaskBackend>>,
}

impl fmt::Debug for RemoteSyncClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteSyncClient")
            .field("configured", &self.is_configured())
            .finish()
    }
}

impl RemoteSyncClient {
    pub fn new(backend: Arc<dyn TaskBackend>) -> Self {
        Self {
            backend: Some(backend),
        }
    }

    /// Client with no backend: every write settles as `Unconfigured`.
    pub fn disabled() -> Self {
        Self { backend: None }
    }

    /// Build from configuration. A blank or unusable remote URL yields a
    /// disabled client.
    pub fn from_config(config: &Config) -> Self {
        if !config.remote_enabled() {
            return Self::disabled();
        }
        match RestEndpoint::new(&config.remote.url, config.remote.anon_key.clone()) {
            Ok(endpoint) => Self::new(Arc::new(PostgrestBackend::new(
                endpoint,
                config.remote.tasks_table.clone(),
            ))),
            Err(e) => {
                tracing::warn!(url = %config.remote.url, error = %e, "remote sync disabled");
                Self::disabled()
            }
        }
    }

    pub fn is_configured(&self) -> bool {
        self.backend.is_some()
    }

    pub async fn insert(&self, task: &Task) -> RemoteOutcome {
        let Some(backend) = &self.backend else {
            tracing::debug!(task_id = task.id, "remote not configured; skipping insert");
            return RemoteOutcome::Unconfigured;
        };
        settle("insert", task.id, backend.insert_row(task).await)
    }

    pub async fn update_completed(&self, id: i64, completed: bool) -> RemoteOutcome {
        self.update(id, TaskPatch::completed(completed)).await
    }

    pub async fn update_notes(&self, id: i64, notes: &str) -> RemoteOutcome {
        self.update(id, TaskPatch::notes(notes)).await
    }

    async fn update(&self, id: i64, patch: TaskPatch) -> RemoteOutcome {
        let Some(backend) = &self.backend else {
            tracing::debug!(task_id = id, "remote not configured; skipping update");
            return RemoteOutcome::Unconfigured;
        };
        settle("update", id, backend.update_row(id, &patch).await)
    }

    pub async fn delete(&self, id: i64) -> RemoteOutcome {
        let Some(backend) = &self.backend else {
            tracing::debug!(task_id = id, "remote not configured; skipping delete");
            return RemoteOutcome::Unconfigured;
        };
        settle("delete", id, backend.delete_row(id).await)
    }

    pub async fn fetch_snapshot(&self) -> SnapshotOutcome {
        let Some(backend) = &self.backend else {
            return SnapshotOutcome::Unconfigured;
        };
        match backend.select_all().await {
            Ok(rows) => SnapshotOutcome::Fetched(rows),
            Err(e) => {
                tracing::debug!(error = %e, "remote fetch failed");
                SnapshotOutcome::Failed(e.to_string())
            }
        }
    }

    /// Best-effort remote rows; empty when unreachable or unconfigured.
    pub async fn list(&self) -> Vec<Task> {
        match self.fetch_snapshot().await {
            SnapshotOutcome::Fetched(rows) => rows,
            SnapshotOutcome::Failed(_) | SnapshotOutcome::Unconfigured => Vec::new(),
        }
    }
}

fn settle(op: &str, id: i64, result: Result<(), crate::error::SyncError>) -> RemoteOutcome {
    match result {
        Ok(()) => RemoteOutcome::Applied,
        Err(e) => {
            tracing::debug!(task_id = id, op, error = %e, "remote write failed");
            RemoteOutcome::Failed(e.to_string())
        }
    }
}
