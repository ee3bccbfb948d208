//! # tasksync core
//!
//! A personal task list kept in memory, persisted to a local JSON file,
//! optionally mirrored to a PostgREST-style remote table, with best-effort
//! webhook notifications for every mutation.
//!
//! ## Key Components
//!
//! - [`LocalTaskStore`]: owner of the task collection; optimistic mutations
//!   with background remote writes and notifications
//! - [`RemoteSyncClient`]: remote table access that always settles
//! - [`NotificationDispatcher`]: deduplicated, time-bounded webhooks
//! - [`ReconciliationLoop`]: periodic pull of the remote table
//! - [`LayeredSettings`]: key/value settings over local, remote and defaults
//! - [`Config`]: `config.toml` in the data directory
//!
//! All async entry points expect a tokio runtime.

pub mod error;
pub mod notify;
pub mod session;
pub mod settings;
pub mod storage;
pub mod store;
pub mod sync;
pub mod task;

pub use error::{ConfigError, CoreError, SettingsError, SyncError, ValidationError};
pub use notify::{ChatError, ChatRelay, DispatchOutcome, NotificationDispatcher, NotificationEvent};
pub use session::Session;
pub use settings::{LayeredSettings, SettingsProvider, CHAT_WEBHOOK_URL, TASK_WEBHOOK_URL};
pub use storage::{Config, TaskFile};
pub use store::{LocalTaskStore, MutationHandle, MutationReport, ReconcileSummary};
pub use sync::{ReconcileHandle, ReconciliationLoop, RemoteOutcome, RemoteSyncClient};
pub use task::{Task, TaskFilter};
