use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

use crate::task::Task;

/// Kinds of outbound webhook events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationEvent {
    TaskCreated,
    TaskUpdated,
    TaskDeleted,
    TaskNotesUpdated,
    ChatMessage,
}

impl NotificationEvent {
    pub fn as_str(self) -> &'static str {
        match self {
            NotificationEvent::TaskCreated => "task_created",
            NotificationEvent::TaskUpdated => "task_updated",
            NotificationEvent::TaskDeleted => "task_deleted",
            NotificationEvent::TaskNotesUpdated => "task_notes_updated",
            NotificationEvent::ChatMessage => "chat_message",
        }
    }
}

impl fmt::Display for NotificationEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// ISO-8601 with millisecond precision and a `Z` suffix.
pub(crate) fn serialize_timestamp<S: Serializer>(
    ts: &DateTime<Utc>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// Body POSTed to the task webhook.
#[derive(Debug, Clone, Serialize)]
pub struct WebhookPayload<'a> {
    pub event: NotificationEvent,
    pub task: &'a Task,
    #[serde(serialize_with = "serialize_timestamp")]
    pub timestamp: DateTime<Utc>,
}

impl<'a> WebhookPayload<'a> {
    /// Payload stamped with the current time.
    pub fn new(event: NotificationEvent, task: &'a Task) -> Self {
        Self {
            event,
            task,
            timestamp: Utc::now(),
        }
    }
}
