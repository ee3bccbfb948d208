//! Key/value settings consumed by the notification side.
//!
//! Values are looked up through layers in precedence order: the local
//! settings file, the remote `settings` table, then read-only defaults from
//! `config.toml` and the environment.

mod defaults;
mod local;
mod remote;

pub use defaults::DefaultSettings;
pub use local::LocalSettings;
pub use remote::RemoteSettings;

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::{Result, SettingsError, ValidationError};

/// Endpoint for task mutation events.
pub const TASK_WEBHOOK_URL: &str = "taskWebhookUrl";
/// Endpoint for chat messages.
pub const CHAT_WEBHOOK_URL: &str = "chatWebhookUrl";

/// A source of string settings.
#[async_trait]
pub trait SettingsProvider: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Value for `key`; blank values read as `None`.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn set(&self, key: &str, value: &str) -> Result<()>;
}

pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Chain of providers; first non-empty value wins.
#[derive(Clone, Default)]
pub struct LayeredSettings {
    layers: Vec<Arc<dyn SettingsProvider>>,
}

impl LayeredSettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a lower-precedence layer.
    pub fn with_layer(mut self, layer: Arc<dyn SettingsProvider>) -> Self {
        self.layers.push(layer);
        self
    }

    pub fn layer_names(&self) -> Vec<&'static str> {
        self.layers.iter().map(|layer| layer.name()).collect()
    }
}

#[async_trait]
impl SettingsProvider for LayeredSettings {
    fn name(&self) -> &'static str {
        "layered"
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        for layer in &self.layers {
            match layer.get(key).await {
                Ok(Some(value)) => return Ok(Some(value)),
                Ok(None) => {}
                Err(e) => {
                    tracing::debug!(layer = layer.name(), key, error = %e, "settings layer failed");
                }
            }
        }
        Ok(None)
    }

    /// Writes go to the highest-precedence layer.
    async fn set(&self, key: &str, value: &str) -> Result<()> {
        if key.trim().is_empty() {
            return Err(ValidationError::Empty("key".into()).into());
        }
        let layer = self.layers.first().ok_or(SettingsError::NoWritableLayer)?;
        layer.set(key, value).await
    }
}
