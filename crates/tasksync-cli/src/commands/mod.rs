pub mod chat;
pub mod config;
pub mod settings;
pub mod task;
pub mod watch;

use tasksync_core::{Task, TaskFilter};

/// One line per task, then the `completed/total` counter.
pub(crate) fn print_tasks(tasks: &[Task], filter: TaskFilter) {
    let shown = tasksync_core::task::filter_by_status(tasks, filter);
    if shown.is_empty() {
        println!("(no {} tasks)", filter);
    }
    for task in &shown {
        print_task(task);
    }
    println!(
        "{}/{} completed",
        tasksync_core::task::completed_count(tasks),
        tasks.len()
    );
}

pub(crate) fn print_task(task: &Task) {
    let mark = if task.completed { "x" } else { " " };
    match task.notes.as_deref().filter(|n| !n.is_empty()) {
        Some(notes) => println!("[{mark}] {}  {}  ({notes})", task.id, task.title),
        None => println!("[{mark}] {}  {}", task.id, task.title),
    }
}
