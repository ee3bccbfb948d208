use async_trait::async_trait;

use super::{non_blank, SettingsProvider, CHAT_WEBHOOK_URL, TASK_WEBHOOK_URL};
use crate::error::{Result, SettingsError};
use crate::storage::Config;

/// Read-only fallbacks taken from `config.toml` and `TASKSYNC_*` variables.
#[derive(Debug, Clone, Default)]
pub struct DefaultSettings {
    task_webhook_url: Option<String>,
    chat_webhook_url: Option<String>,
}

impl DefaultSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            task_webhook_url: non_blank(Some(config.webhooks.task_url.clone())),
            chat_webhook_url: non_blank(Some(config.webhooks.chat_url.clone())),
        }
    }
}

#[async_trait]
impl SettingsProvider for DefaultSettings {
    fn name(&self) -> &'static str {
        "defaults"
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(match key {
            TASK_WEBHOOK_URL => self.task_webhook_url.clone(),
            CHAT_WEBHOOK_URL => self.chat_webhook_url.clone(),
            _ => None,
        })
    }

    async fn set(&self, _key: &str, _value: &str) -> Result<()> {
        Err(SettingsError::ReadOnly("defaults").into())
    }
}
