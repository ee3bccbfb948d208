//! Task management commands for CLI.

use clap::Subcommand;
use tasksync_core::{MutationHandle, Session, TaskFilter};

use super::{print_task, print_tasks};

#[derive(Subcommand)]
pub enum TaskAction {
    /// Add a pending task
    Add {
        /// Task title
        title: String,
    },
    /// Flip a task between pending and completed
    Toggle {
        /// Task ID
        id: i64,
    },
    /// Replace a task's notes
    Notes {
        /// Task ID
        id: i64,
        /// New notes (empty string clears the text)
        notes: String,
    },
    /// Remove a task
    Remove {
        /// Task ID
        id: i64,
    },
    /// List tasks
    List {
        /// all, completed or pending
        #[arg(long, default_value = "all")]
        filter: TaskFilter,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub async fn run(action: TaskAction) -> Result<(), Box<dyn std::error::Error>> {
    let session = Session::open()?;
    let store = &session.store;

    // Start from the freshest view of the remote table.
    if store.remote().is_configured() {
        session.reconciler().tick().await;
    }

    let handle = match action {
        TaskAction::Add { title } => {
            store.add(&title).ok_or("task title must not be empty")?
        }
        TaskAction::Toggle { id } => store.toggle(id).ok_or_else(|| not_found(id))?,
        TaskAction::Notes { id, notes } => {
            store.set_notes(id, notes).ok_or_else(|| not_found(id))?
        }
        TaskAction::Remove { id } => store.remove(id).ok_or_else(|| not_found(id))?,
        TaskAction::List { filter, json } => {
            let tasks = store.snapshot();
            if json {
                let shown = tasksync_core::task::filter_by_status(&tasks, filter);
                println!("{}", serde_json::to_string_pretty(&shown)?);
            } else {
                print_tasks(&tasks, filter);
            }
            return Ok(());
        }
    };

    report(handle).await;
    Ok(())
}

async fn report(handle: MutationHandle) {
    print_task(handle.task());
    if let Some(report) = handle.settled().await {
        println!("{report}");
    }
}

fn not_found(id: i64) -> String {
    format!("task {id} not found")
}
