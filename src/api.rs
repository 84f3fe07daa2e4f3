use crate::error::ApiError;
use crate::models::Task;
use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

/// Whole-collection persistence: every read returns all tasks and every
/// write replaces them.
#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn fetch_tasks(&self) -> Result<Vec<Task>, ApiError>;

    async fn save_tasks(&self, tasks: &[Task]) -> Result<(), ApiError>;
}

/// Client for a hosted JSON document holding the task array.
pub struct StoreClient {
    client: Client,
    url: String,
}

impl StoreClient {
    pub fn new(url: &str, timeout: Duration) -> Result<StoreClient, ApiError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(StoreClient::with_client(client, url))
    }

    pub fn with_client(client: Client, url: &str) -> StoreClient {
        StoreClient {
            client,
            url: url.to_string(),
        }
    }
}

#[async_trait]
impl TaskStore for StoreClient {
    async fn fetch_tasks(&self) -> Result<Vec<Task>, ApiError> {
        let res = self
            .client
            .get(&self.url)
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        if res.status().is_success() {
            let body = res.text().await?;
            parse_collection(&body)
        } else {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            Err(ApiError::Status {
                action: "fetch",
                status,
                body,
            })
        }
    }

    async fn save_tasks(&self, tasks: &[Task]) -> Result<(), ApiError> {
        let res = self
            .client
            .put(&self.url)
            .header(ACCEPT, "application/json")
            .json(tasks)
            .send()
            .await?;

        if res.status().is_success() {
            log::debug!("saved {} tasks", tasks.len());
            Ok(())
        } else {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            Err(ApiError::Status {
                action: "save",
                status,
                body,
            })
        }
    }
}

/// A document that is not a JSON array (a fresh blob, `{}` or `null`) is an
/// empty collection.
pub fn parse_collection(body: &str) -> Result<Vec<Task>, ApiError> {
    if body.trim().is_empty() {
        return Ok(Vec::new());
    }
    match serde_json::from_str::<Value>(body)? {
        value @ Value::Array(_) => Ok(serde_json::from_value(value)?),
        _ => Ok(Vec::new()),
    }
}
