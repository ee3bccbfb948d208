//! Tests for the remote sync client.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::super::client::*;
    use crate::storage::Config;
    use crate::sync::backend::TaskBackend;
    use crate::sync::testing::FakeBackend;
    use crate::task::Task;

    fn client(backend: &Arc<FakeBackend>) -> RemoteSyncClient {
        RemoteSyncClient::new(Arc::clone(backend) as Arc<dyn TaskBackend>)
    }

    #[tokio::test]
    async fn writes_settle_as_applied() {
        let backend = Arc::new(FakeBackend::default());
        let client = client(&backend);

        assert_eq!(client.insert(&Task::new(1, "a")).await, RemoteOutcome::Applied);
        assert_eq!(client.update_completed(1, true).await, RemoteOutcome::Applied);
        assert_eq!(client.update_notes(1, "n").await, RemoteOutcome::Applied);

        let rows = backend.rows();
        assert!(rows[0].completed);
        assert_eq!(rows[0].notes.as_deref(), Some("n"));

        assert_eq!(client.delete(1).await, RemoteOutcome::Applied);
        assert!(backend.rows().is_empty());
        assert_eq!(
            backend.calls(),
            vec!["insert 1", "update 1", "update 1", "delete 1"]
        );
    }

    #[tokio::test]
    async fn backend_errors_become_failed_outcomes() {
        let backend = Arc::new(FakeBackend::default());
        backend.set_failing(true);
        let client = client(&backend);

        let outcome = client.insert(&Task::new(1, "a")).await;
        match outcome {
            RemoteOutcome::Failed(reason) => assert!(reason.contains("503")),
            other => panic!("expected failure, got {other:?}"),
        }
        assert!(matches!(client.fetch_snapshot().await, SnapshotOutcome::Failed(_)));
        assert!(client.list().await.is_empty());
    }

    #[tokio::test]
    async fn disabled_client_attempts_nothing() {
        let client = RemoteSyncClient::disabled();
        assert!(!client.is_configured());
        assert_eq!(client.insert(&Task::new(1, "a")).await, RemoteOutcome::Unconfigured);
        assert_eq!(client.delete(1).await, RemoteOutcome::Unconfigured);
        assert_eq!(client.fetch_snapshot().await, SnapshotOutcome::Unconfigured);
        assert!(client.list().await.is_empty());
    }

    #[tokio::test]
    async fn snapshot_returns_remote_rows() {
        let backend = Arc::new(FakeBackend::with_rows(vec![Task::new(1, "a"), Task::new(2, "b")]));
        let client = client(&backend);
        assert_eq!(
            client.fetch_snapshot().await,
            SnapshotOutcome::Fetched(vec![Task::new(1, "a"), Task::new(2, "b")])
        );
    }

    #[test]
    fn config_without_url_yields_disabled_client() {
        let config = Config::default();
        assert!(!RemoteSyncClient::from_config(&config).is_configured());
    }

    #[test]
    fn config_with_bad_url_yields_disabled_client() {
        let mut config = Config::default();
        config.remote.url = "not a url".into();
        assert!(!RemoteSyncClient::from_config(&config).is_configured());

        config.remote.url = "https://project.supabase.co".into();
        assert!(RemoteSyncClient::from_config(&config).is_configured());
    }
}
