//! Wiring of the configured components into one running session.

use std::path::Path;
use std::sync::Arc;

use crate::error::Result;
use crate::notify::{ChatRelay, NotificationDispatcher};
use crate::settings::{DefaultSettings, LayeredSettings, LocalSettings, RemoteSettings, SettingsProvider};
use crate::storage::{data_dir, Config, TaskFile};
use crate::store::LocalTaskStore;
use crate::sync::{ReconciliationLoop, RemoteSyncClient, RestEndpoint};

/// Everything a front end needs: the store, the settings chain, the chat
/// relay and a ready-to-start reconciliation loop.
#[derive(Clone)]
pub struct Session {
    pub config: Config,
    pub settings: Arc<LayeredSettings>,
    pub store: LocalTaskStore,
    pub chat: ChatRelay,
}

impl Session {
    /// Load `config.toml` from the data directory and open a session there.
    pub fn open() -> Result<Self> {
        let config = Config::load()?;
        let dir = data_dir()?;
        Ok(Self::with_config(config, &dir))
    }

    /// Session keeping its files in `dir`.
    pub fn with_config(config: Config, dir: &Path) -> Self {
        let settings = Arc::new(settings_chain(&config, dir));
        let shared: Arc<dyn SettingsProvider> = settings.clone();

        let dispatcher = NotificationDispatcher::from_config(&config, Arc::clone(&shared));
        let store = LocalTaskStore::new(RemoteSyncClient::from_config(&config), dispatcher)
            .with_pending_ttl(config.pending_ttl())
            .with_task_file(TaskFile::in_dir(dir));
        let chat = ChatRelay::with_timeout(shared, config.webhook_timeout());

        tracing::debug!(
            layers = ?settings.layer_names(),
            remote = store.remote().is_configured(),
            tasks = store.len(),
            "session opened"
        );

        Self {
            config,
            settings,
            store,
            chat,
        }
    }

    /// Reconciliation loop at the configured poll interval; not started.
    pub fn reconciler(&self) -> ReconciliationLoop {
        ReconciliationLoop::new(self.store.clone()).with_interval(self.config.poll_interval())
    }
}

/// Local file first, then the remote table if one is configured, then the
/// read-only defaults.
fn settings_chain(config: &Config, dir: &Path) -> LayeredSettings {
    let mut chain = LayeredSettings::new()
        .with_layer(Arc::new(LocalSettings::in_dir(dir)));

    if config.remote_enabled() {
        match RestEndpoint::new(&config.remote.url, config.remote.anon_key.clone()) {
            Ok(endpoint) => {
                chain = chain.with_layer(Arc::new(RemoteSettings::new(
                    endpoint,
                    config.remote.settings_table.clone(),
                )));
            }
            Err(e) => tracing::warn!(url = %config.remote.url, error = %e, "remote settings disabled"),
        }
    }

    chain.with_layer(Arc::new(DefaultSettings::from_config(config)))
}
