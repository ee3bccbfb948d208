use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::{non_blank, SettingsProvider};
use crate::error::{Result, SettingsError};

const SETTINGS_FILE: &str = "settings.json";

/// Settings stored as a flat JSON object on local disk.
#[derive(Debug)]
pub struct LocalSettings {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl LocalSettings {
    /// `settings.json` inside `dir`.
    pub fn in_dir(dir: &Path) -> Self {
        Self::new_with_path(dir.join(SETTINGS_FILE))
    }

    pub fn new_with_path(path: PathBuf) -> Self {
        Self {
            path,
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn file_error(&self, e: impl std::fmt::Display) -> SettingsError {
        SettingsError::File {
            path: self.path.clone(),
            message: e.to_string(),
        }
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => Ok(serde_json::from_str(&content).map_err(|e| self.file_error(e))?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(self.file_error(e).into()),
        }
    }
}

#[async_trait]
impl SettingsProvider for LocalSettings {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(non_blank(self.read_all()?.remove(key)))
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let mut values = self.read_all()?;
        if value.trim().is_empty() {
            values.remove(key);
        } else {
            values.insert(key.to_string(), value.to_string());
        }
        let data = serde_json::to_string_pretty(&values)?;
        std::fs::write(&self.path, data).map_err(|e| self.file_error(e))?;
        Ok(())
    }
}
