//! In-memory doubles shared by unit tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::{Result, SyncError};
use crate::settings::SettingsProvider;
use crate::sync::backend::{TaskBackend, TaskPatch};
use crate::task::Task;

/// Remote table held in memory; can be switched into a failing mode.
#[derive(Default)]
pub struct FakeBackend {
    pub rows: Mutex<Vec<Task>>,
    pub fail: Mutex<bool>,
    pub calls: Mutex<Vec<String>>,
}

impl FakeBackend {
    pub fn with_rows(rows: Vec<Task>) -> Self {
        Self {
            rows: Mutex::new(rows),
            ..Self::default()
        }
    }

    pub fn set_failing(&self, fail: bool) {
        *self.fail.lock().unwrap() = fail;
    }

    pub fn rows(&self) -> Vec<Task> {
        self.rows.lock().unwrap().clone()
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) -> std::result::Result<(), SyncError> {
        self.calls.lock().unwrap().push(call);
        if *self.fail.lock().unwrap() {
            return Err(SyncError::Backend {
                status: 503,
                message: "unavailable".into(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl TaskBackend for FakeBackend {
    async fn select_all(&self) -> std::result::Result<Vec<Task>, SyncError> {
        self.record("select".into())?;
        Ok(self.rows())
    }

    async fn insert_row(&self, task: &Task) -> std::result::Result<(), SyncError> {
        self.record(format!("insert {}", task.id))?;
        self.rows.lock().unwrap().push(task.clone());
        Ok(())
    }

    async fn update_row(&self, id: i64, patch: &TaskPatch) -> std::result::Result<(), SyncError> {
        self.record(format!("update {id}"))?;
        let mut rows = self.rows.lock().unwrap();
        if let Some(row) = rows.iter_mut().find(|row| row.id == id) {
            if let Some(completed) = patch.completed {
                row.completed = completed;
            }
            if let Some(notes) = &patch.notes {
                row.notes = Some(notes.clone());
            }
        }
        Ok(())
    }

    async fn delete_row(&self, id: i64) -> std::result::Result<(), SyncError> {
        self.record(format!("delete {id}"))?;
        self.rows.lock().unwrap().retain(|row| row.id != id);
        Ok(())
    }
}

/// Fixed settings map.
#[derive(Default)]
pub struct StaticSettings(pub HashMap<String, String>);

impl StaticSettings {
    pub fn with(key: &str, value: &str) -> Self {
        Self(HashMap::from([(key.to_string(), value.to_string())]))
    }
}

#[async_trait]
impl SettingsProvider for StaticSettings {
    fn name(&self) -> &'static str {
        "static"
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.0.get(key).cloned().filter(|v| !v.is_empty()))
    }

    async fn set(&self, _key: &str, _value: &str) -> Result<()> {
        Ok(())
    }
}
