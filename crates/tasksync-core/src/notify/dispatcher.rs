//! Best-effort task webhooks.
//!
//! `dispatch` never fails: every path ends in a `DispatchOutcome` and at
//! most a log line. Order of checks: dedup, then endpoint lookup,
//! validation and POST under one timeout.

use reqwest::Client;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use super::dedup::DedupCache;
use super::endpoint::{validate_endpoint, EndpointError};
use super::event::{NotificationEvent, WebhookPayload};
use crate::settings::{SettingsProvider, TASK_WEBHOOK_URL};
use crate::storage::Config;
use crate::task::Task;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(5000);
pub const DEFAULT_DEDUP_WINDOW: Duration = Duration::from_millis(1000);
pub const DEFAULT_DEDUP_CAPACITY: usize = 1024;

/// What happened to one notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The endpoint answered; any status counts.
    Delivered { status: u16 },
    /// Same event for the same task inside the dedup window.
    Duplicate,
    /// No endpoint configured.
    NoEndpoint,
    InvalidEndpoint(EndpointError),
    /// Cancelled at the timeout bound.
    TimedOut,
    /// Transport failure before any response.
    Failed(String),
}

impl DispatchOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, DispatchOutcome::Delivered { .. })
    }
}

impl fmt::Display for DispatchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchOutcome::Delivered { status } => write!(f, "delivered (HTTP {status})"),
            DispatchOutcome::Duplicate => f.write_str("skipped (duplicate)"),
            DispatchOutcome::NoEndpoint => f.write_str("skipped (no webhook configured)"),
            DispatchOutcome::InvalidEndpoint(e) => write!(f, "skipped ({e})"),
            DispatchOutcome::TimedOut => f.write_str("timed out"),
            DispatchOutcome::Failed(reason) => write!(f, "failed ({reason})"),
        }
    }
}

struct Inner {
    http: Client,
    settings: Arc<dyn SettingsProvider>,
    dedup: Mutex<DedupCache>,
    timeout: Duration,
}

/// Shared handle; clones share one dedup cache.
#[derive(Clone)]
pub struct NotificationDispatcher {
    inner: Arc<Inner>,
}

impl fmt::Debug for NotificationDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotificationDispatcher")
            .field("settings", &self.inner.settings.name())
            .field("timeout", &self.inner.timeout)
            .finish()
    }
}

impl NotificationDispatcher {
    pub fn new(settings: Arc<dyn SettingsProvider>) -> Self {
        Self::with_limits(
            settings,
            DEFAULT_TIMEOUT,
            DEFAULT_DEDUP_WINDOW,
            DEFAULT_DEDUP_CAPACITY,
        )
    }

    pub fn with_limits(
        settings: Arc<dyn SettingsProvider>,
        timeout: Duration,
        dedup_window: Duration,
        dedup_capacity: usize,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                http: Client::new(),
                settings,
                dedup: Mutex::new(DedupCache::new(dedup_window, dedup_capacity)),
                timeout,
            }),
        }
    }

    pub fn from_config(config: &Config, settings: Arc<dyn SettingsProvider>) -> Self {
        Self::with_limits(
            settings,
            config.webhook_timeout(),
            config.dedup_window(),
            config.webhooks.dedup_capacity,
        )
    }

    /// Send `event` for `task` to the configured task webhook.
    pub async fn dispatch(&self, event: NotificationEvent, task: &Task) -> DispatchOutcome {
        let fresh = self
            .inner
            .dedup
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .check_and_mark((event, task.id), Instant::now());
        if !fresh {
            tracing::debug!(%event, task_id = task.id, "skipping duplicate webhook event");
            return DispatchOutcome::Duplicate;
        }

        match tokio::time::timeout(self.inner.timeout, self.deliver(event, task)).await {
            Ok(outcome) => outcome,
            Err(_) => {
                tracing::debug!(
                    %event,
                    task_id = task.id,
                    timeout_ms = self.inner.timeout.as_millis() as u64,
                    "webhook request aborted (timeout)"
                );
                DispatchOutcome::TimedOut
            }
        }
    }

    /// Endpoint lookup, validation and POST; bounded as a whole by `dispatch`.
    async fn deliver(&self, event: NotificationEvent, task: &Task) -> DispatchOutcome {
        let raw = match self.inner.settings.get(TASK_WEBHOOK_URL).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return DispatchOutcome::NoEndpoint,
            Err(e) => {
                tracing::debug!(error = %e, "cannot read webhook setting");
                return DispatchOutcome::NoEndpoint;
            }
        };

        let url = match validate_endpoint(&raw) {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!(url = %raw, error = %e, "skipping webhook");
                return DispatchOutcome::InvalidEndpoint(e);
            }
        };

        let payload = WebhookPayload::new(event, task);
        match self.inner.http.post(url.clone()).json(&payload).send().await {
            Ok(resp) => DispatchOutcome::Delivered {
                status: resp.status().as_u16(),
            },
            Err(e) => {
                tracing::debug!(%url, error = %e, "webhook request failed");
                DispatchOutcome::Failed(e.to_string())
            }
        }
    }
}
