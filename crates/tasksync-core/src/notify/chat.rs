//! Chat messages relayed to an automation webhook.
//!
//! The endpoint is expected to answer with `[{"output": "..."}]`. Unlike task
//! notifications the caller waits for the reply, so failures are returned.

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use super::dispatcher::DEFAULT_TIMEOUT;
use super::endpoint::{validate_endpoint, EndpointError};
use super::event::{serialize_timestamp, NotificationEvent};
use crate::settings::{SettingsProvider, CHAT_WEBHOOK_URL};

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("message is empty")]
    Empty,

    #[error("chat webhook URL is not configured")]
    NotConfigured,

    #[error(transparent)]
    InvalidEndpoint(#[from] EndpointError),

    #[error("chat webhook answered HTTP {0}")]
    Status(u16),

    #[error("chat webhook timed out after {0:?}")]
    Timeout(Duration),

    #[error("chat webhook request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

#[derive(Debug, Serialize)]
struct ChatPayload<'a> {
    event: NotificationEvent,
    message: &'a str,
    #[serde(serialize_with = "serialize_timestamp")]
    timestamp: DateTime<Utc>,
    #[serde(rename = "userId")]
    user_id: i64,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    output: Option<serde_json::Value>,
}

#[derive(Clone)]
pub struct ChatRelay {
    http: Client,
    settings: Arc<dyn SettingsProvider>,
    timeout: Duration,
}

impl ChatRelay {
    pub fn new(settings: Arc<dyn SettingsProvider>) -> Self {
        Self::with_timeout(settings, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(settings: Arc<dyn SettingsProvider>, timeout: Duration) -> Self {
        Self {
            http: Client::new(),
            settings,
            timeout,
        }
    }

    /// Send `message` on behalf of `user_id`; returns the bot's reply if the
    /// response carried one.
    pub async fn send(&self, message: &str, user_id: i64) -> Result<Option<String>, ChatError> {
        let message = message.trim();
        if message.is_empty() {
            return Err(ChatError::Empty);
        }

        let raw = match self.settings.get(CHAT_WEBHOOK_URL).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return Err(ChatError::NotConfigured),
            Err(e) => {
                tracing::debug!(error = %e, "cannot read chat webhook setting");
                return Err(ChatError::NotConfigured);
            }
        };
        let url = validate_endpoint(&raw)?;

        let payload = ChatPayload {
            event: NotificationEvent::ChatMessage,
            message,
            timestamp: Utc::now(),
            user_id,
        };

        let exchange = async {
            let resp = self.http.post(url).json(&payload).send().await?;
            let status = resp.status();
            if !status.is_success() {
                return Err(ChatError::Status(status.as_u16()));
            }
            let body = resp.text().await?;
            Ok::<_, ChatError>(parse_reply(&body))
        };

        tokio::time::timeout(self.timeout, exchange)
            .await
            .map_err(|_| ChatError::Timeout(self.timeout))?
    }
}

/// Text of the first `output` string in a `[{"output": ...}]` body.
fn parse_reply(body: &str) -> Option<String> {
    let replies: Vec<ChatReply> = serde_json::from_str(body).ok()?;
    match replies.into_iter().next()?.output? {
        serde_json::Value::String(text) => Some(text),
        _ => None,
    }
}
