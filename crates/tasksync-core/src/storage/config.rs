//! TOML-based application configuration.
//!
//! Stores:
//! - Remote persistence backend location and key
//! - Reconciliation timing
//! - Default webhook endpoints and dispatch limits
//!
//! Configuration is stored at `~/.config/tasksync/config.toml`. A handful of
//! environment variables override the file after loading, so deployments can
//! inject endpoints without touching disk.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::data_dir;
use crate::error::ConfigError;

/// Remote persistence backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Base URL of the REST backend. Empty disables remote sync.
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub anon_key: String,
    #[serde(default = "default_tasks_table")]
    pub tasks_table: String,
    #[serde(default = "default_settings_table")]
    pub settings_table: String,
}

/// Reconciliation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// How long a local write shields its task from remote snapshots.
    #[serde(default = "default_pending_ttl_ms")]
    pub pending_ttl_ms: u64,
}

/// Webhook configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhooksConfig {
    /// Fallback for the `taskWebhookUrl` setting.
    #[serde(default)]
    pub task_url: String,
    /// Fallback for the `chatWebhookUrl` setting.
    #[serde(default)]
    pub chat_url: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_dedup_window_ms")]
    pub dedup_window_ms: u64,
    #[serde(default = "default_dedup_capacity")]
    pub dedup_capacity: usize,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/tasksync/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub remote: RemoteConfig,
    #[serde(default)]
    pub sync: SyncConfig,
    #[serde(default)]
    pub webhooks: WebhooksConfig,
}

// Default functions
fn default_tasks_table() -> String {
    "tasks".into()
}
fn default_settings_table() -> String {
    "settings".into()
}
fn default_poll_interval_ms() -> u64 {
    1000
}
fn default_pending_ttl_ms() -> u64 {
    10_000
}
fn default_timeout_ms() -> u64 {
    5000
}
fn default_dedup_window_ms() -> u64 {
    1000
}
fn default_dedup_capacity() -> usize {
    1024
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            anon_key: String::new(),
            tasks_table: default_tasks_table(),
            settings_table: default_settings_table(),
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            pending_ttl_ms: default_pending_ttl_ms(),
        }
    }
}

impl Default for WebhooksConfig {
    fn default() -> Self {
        Self {
            task_url: String::new(),
            chat_url: String::new(),
            timeout_ms: default_timeout_ms(),
            dedup_window_ms: default_dedup_window_ms(),
            dedup_capacity: default_dedup_capacity(),
        }
    }
}

/// Environment variables that take precedence over the file.
const ENV_OVERRIDES: &[(&str, &str)] = &[
    ("TASKSYNC_REMOTE_URL", "remote.url"),
    ("TASKSYNC_REMOTE_KEY", "remote.anon_key"),
    ("TASKSYNC_WEBHOOK_URL", "webhooks.task_url"),
    ("TASKSYNC_CHAT_WEBHOOK_URL", "webhooks.chat_url"),
];

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if key.is_empty() {
            return Err(ConfigError::UnknownKey(String::new()));
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current
                    .as_object_mut()
                    .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
                let existing = obj
                    .get(part)
                    .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value.parse::<bool>().map_err(|e| invalid(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => {
                        let n = value
                            .parse::<u64>()
                            .map_err(|_| invalid(format!("cannot parse '{value}' as number")))?;
                        serde_json::Value::Number(n.into())
                    }
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        return Err(invalid("cannot assign to a section".to_string()));
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current
                .get_mut(part)
                .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
        }

        Err(ConfigError::UnknownKey(key.to_string()))
    }

    fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk or return default, then apply environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        let mut cfg = Self::load_stored()?;
        cfg.apply_env_overrides();
        Ok(cfg)
    }

    /// The file contents alone, without environment overrides. Use this
    /// before `set` so overrides are not written back.
    pub fn load_stored() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Load from an explicit path, writing defaults if the file is missing.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
    }

    /// Overlay non-empty `TASKSYNC_*` environment variables.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        for (var, target) in ENV_OVERRIDES {
            let Some(value) = lookup(var).filter(|v| !v.trim().is_empty()) else {
                continue;
            };
            match *target {
                "remote.url" => self.remote.url = value,
                "remote.anon_key" => self.remote.anon_key = value,
                "webhooks.task_url" => self.webhooks.task_url = value,
                "webhooks.chat_url" => self.webhooks.chat_url = value,
                _ => {}
            }
        }
    }

    /// Name of the `TASKSYNC_*` variable currently masking `key`, if any.
    pub fn env_override(key: &str) -> Option<&'static str> {
        Self::override_for(key, |name| std::env::var(name).ok())
    }

    fn override_for(key: &str, lookup: impl Fn(&str) -> Option<String>) -> Option<&'static str> {
        ENV_OVERRIDES
            .iter()
            .find(|(var, target)| {
                *target == key && lookup(var).is_some_and(|v| !v.trim().is_empty())
            })
            .map(|(var, _)| *var)
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key without saving.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value cannot be parsed.
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };
        let mut json = serde_json::to_value(&*self).map_err(|e| invalid(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        *self = serde_json::from_value(json).map_err(|e| invalid(e.to_string()))?;
        Ok(())
    }

    /// Set a config value by key and save.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the config cannot be saved.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        self.set_value(key, value)?;
        self.save()
    }

    /// Whether a remote backend is configured.
    pub fn remote_enabled(&self) -> bool {
        !self.remote.url.trim().is_empty()
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.sync.poll_interval_ms.max(1))
    }

    pub fn pending_ttl(&self) -> Duration {
        Duration::from_millis(self.sync.pending_ttl_ms)
    }

    pub fn webhook_timeout(&self) -> Duration {
        Duration::from_millis(self.webhooks.timeout_ms)
    }

    pub fn dedup_window(&self) -> Duration {
        Duration::from_millis(self.webhooks.dedup_window_ms)
    }
}
