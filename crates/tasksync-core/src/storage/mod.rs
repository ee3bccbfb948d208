mod config;
pub mod task_file;

pub use config::{Config, RemoteConfig, SyncConfig, WebhooksConfig};
pub use task_file::TaskFile;

use crate::error::ConfigError;
use std::path::PathBuf;

/// Returns `~/.config/tasksync[-dev]/` based on TASKSYNC_ENV.
///
/// Set TASKSYNC_ENV=dev to use the development data directory, or
/// TASKSYNC_DATA_DIR to point somewhere else entirely.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("TASKSYNC_DATA_DIR") {
        Some(custom) if !custom.is_empty() => PathBuf::from(custom),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("TASKSYNC_ENV").unwrap_or_else(|_| "production".to_string());

            if env == "dev" {
                base_dir.join("tasksync-dev")
            } else {
                base_dir.join("tasksync")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
