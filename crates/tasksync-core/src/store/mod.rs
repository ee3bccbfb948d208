//! The single owner of the in-memory task collection.
//!
//! Mutations are optimistic: the collection changes before the call
//! returns, while the remote write and the webhook run on a spawned task.
//! Remote write first, notification once it settles. The returned
//! `MutationHandle` can be dropped (fire-and-forget) or awaited for the
//! outcome.
//!
//! Must be used from inside a tokio runtime.

use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::notify::{DispatchOutcome, NotificationDispatcher, NotificationEvent};
use crate::storage::TaskFile;
use crate::sync::client::{RemoteOutcome, RemoteSyncClient};
use crate::sync::pending::{Expected, PendingMutations};
use crate::task::{self, Task, TaskFilter};

pub const DEFAULT_PENDING_TTL: Duration = Duration::from_secs(10);

struct StoreState {
    tasks: Vec<Task>,
    pending: PendingMutations,
}

fn lock(state: &Mutex<StoreState>) -> MutexGuard<'_, StoreState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

enum RemoteOp {
    Insert(Task),
    SetCompleted(i64, bool),
    SetNotes(i64, String),
    Delete(i64),
}

/// Outcome of the background half of a mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationReport {
    pub task_id: i64,
    pub event: NotificationEvent,
    pub remote: RemoteOutcome,
    pub notification: DispatchOutcome,
}

impl fmt::Display for MutationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} #{}: remote {}, webhook {}",
            self.event, self.task_id, self.remote, self.notification
        )
    }
}

/// Background remote write + notification for one mutation.
#[derive(Debug)]
pub struct MutationHandle {
    task: Task,
    join: JoinHandle<MutationReport>,
}

impl MutationHandle {
    /// The task as it stood right after the local change (the removed task
    /// for deletions).
    pub fn task(&self) -> &Task {
        &self.task
    }

    /// Wait for the remote call and the notification to settle.
    pub async fn settled(self) -> Option<MutationReport> {
        match self.join.await {
            Ok(report) => Some(report),
            Err(e) => {
                tracing::debug!(task_id = self.task.id, error = %e, "mutation job did not finish");
                None
            }
        }
    }
}

/// Result of merging one remote snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReconcileSummary {
    pub remote_rows: usize,
    /// Rows where an unconfirmed local write overrode the snapshot.
    pub kept_local: usize,
    pub changed: bool,
}

#[derive(Clone)]
pub struct LocalTaskStore {
    state: Arc<Mutex<StoreState>>,
    remote: RemoteSyncClient,
    dispatcher: NotificationDispatcher,
    file: Option<TaskFile>,
    revision: Arc<watch::Sender<u64>>,
}

impl fmt::Debug for LocalTaskStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalTaskStore")
            .field("tasks", &self.len())
            .field("remote", &self.remote)
            .finish()
    }
}

impl LocalTaskStore {
    pub fn new(remote: RemoteSyncClient, dispatcher: NotificationDispatcher) -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            state: Arc::new(Mutex::new(StoreState {
                tasks: Vec::new(),
                pending: PendingMutations::new(DEFAULT_PENDING_TTL),
            })),
            remote,
            dispatcher,
            file: None,
            revision: Arc::new(revision),
        }
    }

    /// How long local writes shield their task from remote snapshots.
    pub fn with_pending_ttl(self, ttl: Duration) -> Self {
        lock(&self.state).pending = PendingMutations::new(ttl);
        self
    }

    /// Seed the collection.
    pub fn with_tasks(self, tasks: Vec<Task>) -> Self {
        lock(&self.state).tasks = tasks;
        self
    }

    /// Load the collection from `file` and keep it updated from now on.
    pub fn with_task_file(mut self, file: TaskFile) -> Self {
        lock(&self.state).tasks = file.load();
        self.file = Some(file);
        self
    }

    pub fn remote(&self) -> &RemoteSyncClient {
        &self.remote
    }

    // --- read side ---

    pub fn snapshot(&self) -> Vec<Task> {
        lock(&self.state).tasks.clone()
    }

    pub fn filtered(&self, filter: TaskFilter) -> Vec<Task> {
        task::filter_by_status(&lock(&self.state).tasks, filter)
    }

    pub fn completed_count(&self) -> usize {
        task::completed_count(&lock(&self.state).tasks)
    }

    pub fn len(&self) -> usize {
        lock(&self.state).tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, id: i64) -> Option<Task> {
        lock(&self.state).tasks.iter().find(|t| t.id == id).cloned()
    }

    /// Number of local writes not yet confirmed by a snapshot.
    pub fn pending_count(&self) -> usize {
        lock(&self.state).pending.len()
    }

    /// Revision counter bumped on every visible change.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    // --- mutations ---

    /// Append a new pending task. Blank titles are ignored.
    pub fn add(&self, title: &str) -> Option<MutationHandle> {
        let title = title.trim();
        if title.is_empty() {
            return None;
        }

        let (task, seq) = {
            let mut state = lock(&self.state);
            let mut id = task::generate_id();
            while state.tasks.iter().any(|t| t.id == id) {
                id = task::generate_id();
            }
            let task = Task::new(id, title);
            state.tasks.push(task.clone());
            let seq = state
                .pending
                .mark(id, Expected::Present(task.clone()), Instant::now());
            self.local_changed(&state);
            (task, seq)
        };

        let op = RemoteOp::Insert(task.clone());
        Some(self.spawn_remote(task, seq, NotificationEvent::TaskCreated, op))
    }

    /// Flip `completed` in place.
    pub fn toggle(&self, id: i64) -> Option<MutationHandle> {
        let (task, seq) = self.update_in_place(id, |task| task.completed = !task.completed)?;
        let op = RemoteOp::SetCompleted(id, task.completed);
        Some(self.spawn_remote(task, seq, NotificationEvent::TaskUpdated, op))
    }

    /// Replace the notes of a task in place.
    pub fn set_notes(&self, id: i64, notes: impl Into<String>) -> Option<MutationHandle> {
        let notes = notes.into();
        let (task, seq) = self.update_in_place(id, |task| task.notes = Some(notes.clone()))?;
        let op = RemoteOp::SetNotes(id, notes);
        Some(self.spawn_remote(task, seq, NotificationEvent::TaskNotesUpdated, op))
    }

    /// Remove a task; the handle carries the pre-deletion snapshot.
    pub fn remove(&self, id: i64) -> Option<MutationHandle> {
        let (task, seq) = {
            let mut state = lock(&self.state);
            let idx = state.tasks.iter().position(|t| t.id == id)?;
            let task = state.tasks.remove(idx);
            let seq = state.pending.mark(id, Expected::Deleted, Instant::now());
            self.local_changed(&state);
            (task, seq)
        };

        Some(self.spawn_remote(task, seq, NotificationEvent::TaskDeleted, RemoteOp::Delete(id)))
    }

    fn update_in_place(&self, id: i64, change: impl FnOnce(&mut Task)) -> Option<(Task, u64)> {
        let mut state = lock(&self.state);
        let task = state.tasks.iter_mut().find(|t| t.id == id)?;
        change(task);
        let task = task.clone();
        let seq = state
            .pending
            .mark(id, Expected::Present(task.clone()), Instant::now());
        self.local_changed(&state);
        Some((task, seq))
    }

    fn spawn_remote(
        &self,
        task: Task,
        seq: u64,
        event: NotificationEvent,
        op: RemoteOp,
    ) -> MutationHandle {
        let remote = self.remote.clone();
        let dispatcher = self.dispatcher.clone();
        let state = Arc::clone(&self.state);
        let notified = task.clone();

        let join = tokio::spawn(async move {
            let outcome = match op {
                RemoteOp::Insert(row) => remote.insert(&row).await,
                RemoteOp::SetCompleted(id, completed) => remote.update_completed(id, completed).await,
                RemoteOp::SetNotes(id, notes) => remote.update_notes(id, &notes).await,
                RemoteOp::Delete(id) => remote.delete(id).await,
            };

            // A write that never landed must not shield the task; the next
            // snapshot decides.
            if !outcome.is_applied() {
                lock(&state).pending.clear_if_current(notified.id, seq);
            }

            let notification = dispatcher.dispatch(event, &notified).await;
            MutationReport {
                task_id: notified.id,
                event,
                remote: outcome,
                notification,
            }
        });

        MutationHandle { task, join }
    }

    // --- reconciliation ---

    /// Replace the collection with a remote snapshot, except where a live
    /// pending marker says the local value is newer.
    pub fn apply_remote_snapshot(&self, rows: Vec<Task>) -> ReconcileSummary {
        let mut state = lock(&self.state);
        state.pending.prune_expired(Instant::now());

        let remote_rows = rows.len();
        let mut next = Vec::with_capacity(remote_rows);
        let mut seen = HashSet::with_capacity(remote_rows);
        let mut kept_local = 0;

        for row in rows {
            if !seen.insert(row.id) {
                continue;
            }
            let expected = state.pending.expected(row.id).cloned();
            match expected {
                None => next.push(row),
                Some(Expected::Present(expected)) => {
                    if row == expected {
                        state.pending.confirm(row.id);
                        next.push(row);
                    } else {
                        kept_local += 1;
                        next.push(expected);
                    }
                }
                Some(Expected::Deleted) => kept_local += 1,
            }
        }

        for id in state.pending.deleted_ids() {
            if !seen.contains(&id) {
                state.pending.confirm(id);
            }
        }

        // Local rows whose insert has not reached the remote yet.
        let unseen: Vec<Task> = state
            .tasks
            .iter()
            .filter(|t| {
                !seen.contains(&t.id)
                    && matches!(state.pending.expected(t.id), Some(Expected::Present(_)))
            })
            .cloned()
            .collect();
        kept_local += unseen.len();
        next.extend(unseen);

        let changed = next != state.tasks;
        if changed {
            state.tasks = next;
            self.local_changed(&state);
        }

        ReconcileSummary {
            remote_rows,
            kept_local,
            changed,
        }
    }

    fn local_changed(&self, state: &StoreState) {
        if let Some(file) = &self.file {
            if let Err(e) = file.save(&state.tasks) {
                tracing::warn!(path = %file.path().display(), error = %e, "cannot persist tasks");
            }
        }
        self.revision.send_modify(|rev| *rev += 1);
    }
}

#[cfg(test)]
mod tests;
