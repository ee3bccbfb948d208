//! Task entity and pure helpers.
//!
//! `Task` doubles as the remote row shape: its serde field names are the
//! column names of the `tasks` table and the `task` object of webhook
//! payloads.

mod id;

pub use id::{generate_id, IdGenerator};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A single entry in the task list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub completed: bool,
    /// `None` and `Some("")` are different states; `None` serializes as `null`.
    #[serde(default)]
    pub notes: Option<String>,
}

impl Task {
    /// Build a pending task with no notes.
    pub fn new(id: i64, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            completed: false,
            notes: None,
        }
    }
}

/// Status filter used by list views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskFilter {
    #[default]
    All,
    Completed,
    Pending,
}

impl TaskFilter {
    pub fn matches(self, task: &Task) -> bool {
        match self {
            TaskFilter::All => true,
            TaskFilter::Completed => task.completed,
            TaskFilter::Pending => !task.completed,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TaskFilter::All => "all",
            TaskFilter::Completed => "completed",
            TaskFilter::Pending => "pending",
        }
    }
}

impl fmt::Display for TaskFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskFilter {
    type Err = std::convert::Infallible;

    /// Unknown names fall back to `All`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "completed" => TaskFilter::Completed,
            "pending" => TaskFilter::Pending,
            _ => TaskFilter::All,
        })
    }
}

/// Tasks matching `filter`, in their original relative order.
pub fn filter_by_status(tasks: &[Task], filter: TaskFilter) -> Vec<Task> {
    tasks
        .iter()
        .filter(|task| filter.matches(task))
        .cloned()
        .collect()
}

/// Number of completed tasks.
pub fn completed_count(tasks: &[Task]) -> usize {
    tasks.iter().filter(|task| task.completed).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sample() -> Vec<Task> {
        vec![
            Task { id: 1, title: "a".into(), completed: true, notes: None },
            Task { id: 2, title: "b".into(), completed: false, notes: Some(String::new()) },
            Task { id: 3, title: "c".into(), completed: true, notes: Some("x".into()) },
        ]
    }

    #[test]
    fn all_filter_is_identity() {
        let tasks = sample();
        assert_eq!(filter_by_status(&tasks, TaskFilter::All), tasks);
    }

    #[test]
    fn completed_and_pending_partition() {
        let tasks = sample();
        let done: Vec<i64> = filter_by_status(&tasks, TaskFilter::Completed)
            .iter()
            .map(|t| t.id)
            .collect();
        let open: Vec<i64> = filter_by_status(&tasks, TaskFilter::Pending)
            .iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(done, vec![1, 3]);
        assert_eq!(open, vec![2]);
        assert_eq!(completed_count(&tasks), 2);
    }

    #[test]
    fn filter_parses_with_all_fallback() {
        assert_eq!("completed".parse::<TaskFilter>().unwrap(), TaskFilter::Completed);
        assert_eq!(" Pending ".parse::<TaskFilter>().unwrap(), TaskFilter::Pending);
        assert_eq!("whatever".parse::<TaskFilter>().unwrap(), TaskFilter::All);
    }

    #[test]
    fn notes_none_serializes_as_null() {
        let json = serde_json::to_value(Task::new(7, "x")).unwrap();
        assert_eq!(json, serde_json::json!({"id": 7, "title": "x", "completed": false, "notes": null}));
    }

    #[test]
    fn missing_columns_take_defaults() {
        let task: Task = serde_json::from_str(r#"{"id": 5, "title": "t"}"#).unwrap();
        assert!(!task.completed);
        assert_eq!(task.notes, None);
    }

    fn arb_tasks() -> impl Strategy<Value = Vec<Task>> {
        prop::collection::vec(any::<bool>(), 0..40).prop_map(|flags| {
            flags
                .into_iter()
                .enumerate()
                .map(|(i, completed)| Task {
                    id: i as i64,
                    title: format!("task {i}"),
                    completed,
                    notes: None,
                })
                .collect()
        })
    }

    proptest! {
        #[test]
        fn filter_output_is_ordered_subsequence(tasks in arb_tasks(), pick in 0u8..3) {
            let filter = match pick {
                0 => TaskFilter::All,
                1 => TaskFilter::Completed,
                _ => TaskFilter::Pending,
            };
            let out = filter_by_status(&tasks, filter);
            let mut cursor = tasks.iter();
            for task in &out {
                prop_assert!(filter.matches(task));
                prop_assert!(cursor.any(|t| t == task));
            }
            let expected = tasks.iter().filter(|t| filter.matches(t)).count();
            prop_assert_eq!(out.len(), expected);
        }
    }
}
