use std::sync::Arc;
use std::time::Duration;

use super::*;
use crate::settings::SettingsProvider;
use crate::sync::testing::{FakeBackend, StaticSettings};

fn quiet_dispatcher() -> NotificationDispatcher {
    let settings: Arc<dyn SettingsProvider> = Arc::new(StaticSettings::default());
    NotificationDispatcher::new(settings)
}

fn store_with(backend: &Arc<FakeBackend>) -> LocalTaskStore {
    let remote = RemoteSyncClient::new(Arc::clone(backend) as Arc<dyn crate::sync::backend::TaskBackend>);
    LocalTaskStore::new(remote, quiet_dispatcher())
}

fn local_only() -> LocalTaskStore {
    LocalTaskStore::new(RemoteSyncClient::disabled(), quiet_dispatcher())
}

#[tokio::test]
async fn add_appends_pending_task() {
    let store = local_only();
    let handle = store.add("  Buy milk ").unwrap();

    assert_eq!(handle.task().title, "Buy milk");
    assert!(!handle.task().completed);
    assert_eq!(store.snapshot(), vec![handle.task().clone()]);
    assert_eq!(store.filtered(TaskFilter::Pending).len(), 1);
    assert_eq!(store.completed_count(), 0);
}

#[tokio::test]
async fn blank_title_is_ignored() {
    let store = local_only();
    let rx = store.subscribe();
    assert!(store.add("   ").is_none());
    assert!(store.add("").is_none());
    assert!(store.is_empty());
    assert!(!rx.has_changed().unwrap());
}

#[tokio::test]
async fn ids_are_unique_across_rapid_adds() {
    let store = local_only();
    for i in 0..50 {
        store.add(&format!("task {i}")).unwrap();
    }
    let mut ids: Vec<i64> = store.snapshot().iter().map(|t| t.id).collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), 50);
}

#[tokio::test]
async fn add_is_written_remotely_then_notified() {
    let backend = Arc::new(FakeBackend::default());
    let store = store_with(&backend);

    let handle = store.add("Write report").unwrap();
    let id = handle.task().id;
    let report = handle.settled().await.unwrap();

    assert_eq!(report.event, NotificationEvent::TaskCreated);
    assert_eq!(report.remote, RemoteOutcome::Applied);
    assert_eq!(report.notification, DispatchOutcome::NoEndpoint);
    assert_eq!(backend.calls(), vec![format!("insert {id}")]);
    assert_eq!(backend.rows()[0].title, "Write report");
}

#[tokio::test]
async fn toggle_flips_and_patches_remote() {
    let backend = Arc::new(FakeBackend::with_rows(vec![Task::new(7, "a")]));
    let store = store_with(&backend).with_tasks(vec![Task::new(7, "a")]);

    let report = store.toggle(7).unwrap().settled().await.unwrap();
    assert_eq!(report.event, NotificationEvent::TaskUpdated);
    assert!(store.get(7).unwrap().completed);
    assert!(backend.rows()[0].completed);
    assert_eq!(store.completed_count(), 1);

    store.toggle(7).unwrap().settled().await.unwrap();
    assert!(!store.get(7).unwrap().completed);
}

#[tokio::test]
async fn unknown_ids_are_no_ops() {
    let backend = Arc::new(FakeBackend::default());
    let store = store_with(&backend).with_tasks(vec![Task::new(1, "a")]);

    assert!(store.toggle(99).is_none());
    assert!(store.set_notes(99, "x").is_none());
    assert!(store.remove(99).is_none());
    assert_eq!(store.snapshot(), vec![Task::new(1, "a")]);
    assert!(backend.calls().is_empty());
    assert_eq!(store.pending_count(), 0);
}

#[tokio::test]
async fn set_notes_replaces_notes() {
    let backend = Arc::new(FakeBackend::with_rows(vec![Task::new(3, "a")]));
    let store = store_with(&backend).with_tasks(vec![Task::new(3, "a")]);

    let report = store.set_notes(3, "2% please").unwrap().settled().await.unwrap();
    assert_eq!(report.event, NotificationEvent::TaskNotesUpdated);
    assert_eq!(store.get(3).unwrap().notes.as_deref(), Some("2% please"));
    assert_eq!(backend.rows()[0].notes.as_deref(), Some("2% please"));
}

#[tokio::test]
async fn remove_reports_pre_deletion_task() {
    let mut done = Task::new(4, "done");
    done.completed = true;
    let backend = Arc::new(FakeBackend::with_rows(vec![done.clone()]));
    let store = store_with(&backend).with_tasks(vec![done.clone(), Task::new(5, "b")]);

    let handle = store.remove(4).unwrap();
    assert_eq!(handle.task(), &done);
    assert_eq!(store.snapshot(), vec![Task::new(5, "b")]);

    let report = handle.settled().await.unwrap();
    assert_eq!(report.event, NotificationEvent::TaskDeleted);
    assert!(backend.rows().is_empty());
}

#[tokio::test]
async fn failed_remote_write_keeps_local_change_and_drops_marker() {
    let backend = Arc::new(FakeBackend::default());
    backend.set_failing(true);
    let store = store_with(&backend);

    let handle = store.add("offline").unwrap();
    let id = handle.task().id;
    let report = handle.settled().await.unwrap();

    assert!(matches!(report.remote, RemoteOutcome::Failed(_)));
    assert_eq!(report.notification, DispatchOutcome::NoEndpoint);
    assert!(store.get(id).is_some());
    assert_eq!(store.pending_count(), 0);
}

#[tokio::test]
async fn unconfigured_remote_settles_without_calls() {
    let store = local_only();
    let report = store.add("local").unwrap().settled().await.unwrap();
    assert_eq!(report.remote, RemoteOutcome::Unconfigured);
    assert_eq!(store.pending_count(), 0);
}

#[tokio::test]
async fn mutations_bump_revision() {
    let store = local_only().with_tasks(vec![Task::new(1, "a")]);
    let mut rx = store.subscribe();
    let before = *rx.borrow_and_update();

    store.toggle(1);
    assert!(rx.has_changed().unwrap());
    assert!(*rx.borrow_and_update() > before);
}

#[tokio::test]
async fn snapshot_replaces_unmarked_state() {
    let store = local_only().with_tasks(vec![Task::new(1, "old")]);
    let summary = store.apply_remote_snapshot(vec![Task::new(2, "b"), Task::new(3, "c")]);

    assert_eq!(store.snapshot(), vec![Task::new(2, "b"), Task::new(3, "c")]);
    assert_eq!(
        summary,
        ReconcileSummary {
            remote_rows: 2,
            kept_local: 0,
            changed: true
        }
    );

    let again = store.apply_remote_snapshot(vec![Task::new(2, "b"), Task::new(3, "c")]);
    assert!(!again.changed);
}

#[tokio::test]
async fn stale_snapshot_does_not_revert_local_edit() {
    let backend = Arc::new(FakeBackend::with_rows(vec![Task::new(1, "a")]));
    let store = store_with(&backend).with_tasks(vec![Task::new(1, "a")]);
    store.toggle(1).unwrap();

    // Snapshot taken before the update reached the remote.
    let summary = store.apply_remote_snapshot(vec![Task::new(1, "a")]);
    assert!(store.get(1).unwrap().completed);
    assert_eq!(summary.kept_local, 1);
    assert_eq!(store.pending_count(), 1);
}

#[tokio::test]
async fn matching_snapshot_confirms_marker() {
    let backend = Arc::new(FakeBackend::with_rows(vec![Task::new(1, "a")]));
    let store = store_with(&backend).with_tasks(vec![Task::new(1, "a")]);
    store.toggle(1).unwrap().settled().await.unwrap();
    assert_eq!(store.pending_count(), 1);

    store.apply_remote_snapshot(backend.rows());
    assert_eq!(store.pending_count(), 0);
    assert!(store.get(1).unwrap().completed);
}

#[tokio::test]
async fn deleted_task_is_not_resurrected() {
    let backend = Arc::new(FakeBackend::with_rows(vec![Task::new(1, "a")]));
    let store = store_with(&backend).with_tasks(vec![Task::new(1, "a")]);
    store.remove(1).unwrap().settled().await.unwrap();

    let stale = store.apply_remote_snapshot(vec![Task::new(1, "a")]);
    assert!(store.get(1).is_none());
    assert_eq!(stale.kept_local, 1);

    store.apply_remote_snapshot(backend.rows());
    assert_eq!(store.pending_count(), 0);
}

#[tokio::test]
async fn unsent_insert_survives_snapshot() {
    let store = local_only().with_pending_ttl(Duration::from_secs(60));
    {
        // Hold the marker without letting the background job clear it.
        let mut state = lock(&store.state);
        state.tasks.push(Task::new(42, "new"));
        state.pending.mark(42, Expected::Present(Task::new(42, "new")), Instant::now());
    }

    store.apply_remote_snapshot(vec![Task::new(1, "remote")]);
    assert_eq!(store.snapshot(), vec![Task::new(1, "remote"), Task::new(42, "new")]);
}

#[tokio::test]
async fn expired_markers_stop_shielding() {
    let store = local_only().with_pending_ttl(Duration::from_millis(10));
    {
        let mut state = lock(&store.state);
        state.tasks.push(Task::new(9, "gone remotely"));
        state.pending.mark(9, Expected::Present(Task::new(9, "gone remotely")), Instant::now());
    }
    tokio::time::sleep(Duration::from_millis(30)).await;

    store.apply_remote_snapshot(Vec::new());
    assert!(store.is_empty());
    assert_eq!(store.pending_count(), 0);
}

#[tokio::test]
async fn task_file_follows_every_change() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tasks.json");

    let store = local_only().with_task_file(TaskFile::new_with_path(path.clone()));
    let id = store.add("persisted").unwrap().task().id;
    store.set_notes(id, "n");

    let reloaded = TaskFile::new_with_path(path.clone()).load();
    assert_eq!(reloaded.len(), 1);
    assert_eq!(reloaded[0].notes.as_deref(), Some("n"));

    let again = local_only().with_task_file(TaskFile::new_with_path(path));
    assert_eq!(again.snapshot(), reloaded);
}

mod properties {
    use super::*;
    use proptest::prelude::*;

    fn runtime() -> tokio::runtime::Runtime {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap()
    }

    proptest! {
        #[test]
        fn toggle_twice_restores_collection(
            flags in prop::collection::vec(any::<bool>(), 1..20),
            pick in any::<prop::sample::Index>(),
        ) {
            let tasks: Vec<Task> = flags
                .iter()
                .enumerate()
                .map(|(i, &completed)| {
                    let mut task = Task::new(i as i64 + 1, format!("t{i}"));
                    task.completed = completed;
                    task
                })
                .collect();
            let id = tasks[pick.index(tasks.len())].id;

            let after = runtime().block_on(async {
                let store = local_only().with_tasks(tasks.clone());
                store.toggle(id);
                store.toggle(id);
                store.snapshot()
            });
            prop_assert_eq!(after, tasks);
        }

        #[test]
        fn blank_titles_never_grow_collection(title in "[ \t]{0,8}") {
            let len = runtime().block_on(async {
                let store = local_only();
                store.add(&title);
                store.len()
            });
            prop_assert_eq!(len, 0);
        }
    }
}
