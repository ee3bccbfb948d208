//! Local persistence of the task collection.
//!
//! The collection is written as pretty JSON after every local change so the
//! list survives restarts even with no remote backend.

use crate::task::Task;
use std::path::{Path, PathBuf};

const TASK_FILE: &str = "tasks.json";

/// JSON file holding the last known task collection.
#[derive(Debug, Clone)]
pub struct TaskFile {
    path: PathBuf,
}

impl TaskFile {
    /// `tasks.json` inside `dir`.
    pub fn in_dir(dir: &Path) -> Self {
        Self::new_with_path(dir.join(TASK_FILE))
    }

    /// Task file at a specific path (for testing).
    pub fn new_with_path(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the collection. Missing, unreadable or corrupt files yield an
    /// empty list.
    pub fn load(&self) -> Vec<Task> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "cannot read task file");
                return Vec::new();
            }
        };

        match serde_json::from_str(&content) {
            Ok(tasks) => tasks,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "ignoring corrupt task file");
                Vec::new()
            }
        }
    }

    /// Replace the file contents with `tasks`.
    pub fn save(&self, tasks: &[Task]) -> Result<(), std::io::Error> {
        let data = serde_json::to_string_pretty(tasks)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, data)?;
        std::fs::rename(&tmp, &self.path)
    }
}
