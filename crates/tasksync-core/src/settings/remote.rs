use async_trait::async_trait;
use reqwest::Method;
use serde::{Deserialize, Serialize};

use super::{non_blank, SettingsProvider};
use crate::error::{Result, SettingsError, SyncError};
use crate::sync::backend::{check_status, RestEndpoint};

#[derive(Debug, Serialize, Deserialize)]
struct SettingRow {
    key: String,
    #[serde(default)]
    value: Option<String>,
}

/// Settings kept in a remote `key`/`value` table.
#[derive(Debug, Clone)]
pub struct RemoteSettings {
    endpoint: RestEndpoint,
    table: String,
}

impl RemoteSettings {
    pub fn new(endpoint: RestEndpoint, table: impl Into<String>) -> Self {
        Self {
            endpoint,
            table: table.into(),
        }
    }

    async fn fetch(&self, key: &str) -> std::result::Result<Option<String>, SyncError> {
        let mut url = self.endpoint.table_url(&self.table)?;
        url.query_pairs_mut()
            .append_pair("select", "key,value")
            .append_pair("key", &format!("eq.{key}"))
            .append_pair("limit", "1");

        let resp = self.endpoint.request(Method::GET, url).send().await?;
        let rows: Vec<SettingRow> = check_status(resp).await?.json().await?;
        Ok(rows.into_iter().next().and_then(|row| row.value))
    }

    async fn upsert(&self, key: &str, value: &str) -> std::result::Result<(), SyncError> {
        let url = self.endpoint.table_url(&self.table)?;
        let row = SettingRow {
            key: key.to_string(),
            value: Some(value.to_string()),
        };
        let resp = self
            .endpoint
            .request(Method::POST, url)
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(&[row])
            .send()
            .await?;
        check_status(resp).await.map(|_| ())
    }
}

#[async_trait]
impl SettingsProvider for RemoteSettings {
    fn name(&self) -> &'static str {
        "remote"
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let value = self.fetch(key).await.map_err(SettingsError::Remote)?;
        Ok(non_blank(value))
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.upsert(key, value).await.map_err(SettingsError::Remote)?;
        Ok(())
    }
}
