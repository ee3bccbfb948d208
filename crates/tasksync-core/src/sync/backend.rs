//! Remote persistence backend.
//!
//! The remote store is a REST table in the PostgREST dialect (what Supabase
//! exposes under `/rest/v1`). Rows are `Task`s; partial updates use
//! `TaskPatch`.

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::SyncError;
use crate::task::Task;

/// Columns to change on an existing row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl TaskPatch {
    pub fn completed(value: bool) -> Self {
        Self {
            completed: Some(value),
            ..Self::default()
        }
    }

    pub fn notes(value: impl Into<String>) -> Self {
        Self {
            notes: Some(value.into()),
            ..Self::default()
        }
    }
}

/// Row-level operations against the remote task table.
#[async_trait]
pub trait TaskBackend: Send + Sync {
    /// Every row currently stored.
    async fn select_all(&self) -> Result<Vec<Task>, SyncError>;

    async fn insert_row(&self, task: &Task) -> Result<(), SyncError>;

    async fn update_row(&self, id: i64, patch: &TaskPatch) -> Result<(), SyncError>;

    async fn delete_row(&self, id: i64) -> Result<(), SyncError>;
}

/// Base URL plus credentials for a PostgREST service.
#[derive(Debug, Clone)]
pub struct RestEndpoint {
    base: Url,
    api_key: String,
    http: Client,
}

impl RestEndpoint {
    /// `base_url` is the service root, e.g. `https://xyz.supabase.co`.
    pub fn new(base_url: &str, api_key: impl Into<String>) -> Result<Self, SyncError> {
        let mut base = Url::parse(base_url.trim())?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self {
            base,
            api_key: api_key.into(),
            http: Client::new(),
        })
    }

    /// `<base>/rest/v1/<table>`
    pub fn table_url(&self, table: &str) -> Result<Url, SyncError> {
        Ok(self.base.join("rest/v1/")?.join(table)?)
    }

    pub fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self.http.request(method, url);
        if self.api_key.is_empty() {
            builder
        } else {
            builder
                .header("apikey", &self.api_key)
                .bearer_auth(&self.api_key)
        }
    }
}

/// Map a non-success response into `SyncError::Backend`.
pub(crate) async fn check_status(resp: Response) -> Result<Response, SyncError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let message = resp.text().await.unwrap_or_default();
    Err(SyncError::Backend {
        status: status.as_u16(),
        message,
    })
}

/// `TaskBackend` over a PostgREST table.
#[derive(Debug, Clone)]
pub struct PostgrestBackend {
    endpoint: RestEndpoint,
    table: String,
}

impl PostgrestBackend {
    pub fn new(endpoint: RestEndpoint, table: impl Into<String>) -> Self {
        Self {
            endpoint,
            table: table.into(),
        }
    }

    fn row_url(&self, id: i64) -> Result<Url, SyncError> {
        let mut url = self.endpoint.table_url(&self.table)?;
        url.query_pairs_mut().append_pair("id", &format!("eq.{id}"));
        Ok(url)
    }
}

#[async_trait]
impl TaskBackend for PostgrestBackend {
    async fn select_all(&self) -> Result<Vec<Task>, SyncError> {
        let mut url = self.endpoint.table_url(&self.table)?;
        url.query_pairs_mut()
            .append_pair("select", "*")
            .append_pair("order", "id.asc");

        let resp = self.endpoint.request(Method::GET, url).send().await?;
        Ok(check_status(resp).await?.json().await?)
    }

    async fn insert_row(&self, task: &Task) -> Result<(), SyncError> {
        let url = self.endpoint.table_url(&self.table)?;
        let resp = self
            .endpoint
            .request(Method::POST, url)
            .header("Prefer", "return=minimal")
            .json(&[task])
            .send()
            .await?;
        check_status(resp).await.map(|_| ())
    }

    async fn update_row(&self, id: i64, patch: &TaskPatch) -> Result<(), SyncError> {
        let resp = self
            .endpoint
            .request(Method::PATCH, self.row_url(id)?)
            .header("Prefer", "return=minimal")
            .json(patch)
            .send()
            .await?;
        check_status(resp).await.map(|_| ())
    }

    async fn delete_row(&self, id: i64) -> Result<(), SyncError> {
        let resp = self
            .endpoint
            .request(Method::DELETE, self.row_url(id)?)
            .send()
            .await?;
        check_status(resp).await.map(|_| ())
    }
}
