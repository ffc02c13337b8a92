//! HTTP implementation of the remote gateway

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::TaskGateway;
use crate::config::ClientConfig;
use crate::task::{NewTask, Task, TaskId, TaskPatch, TaskQuery};
use crate::{Error, Result};

/// Longest slice of an error body kept in a transport message
const MAX_ERROR_BODY: usize = 200;

/// Talks to the task store over its REST interface
#[derive(Debug, Clone)]
pub struct HttpTaskGateway {
    client: Client,
    base_url: String,
}

impl HttpTaskGateway {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self::with_client(&config.api_url, client))
    }

    /// Use a preconfigured client
    pub fn with_client(base_url: &str, client: Client) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client.request(method, format!("{}{}", self.base_url, path))
    }

    async fn send(&self, method: Method, path: &str, request: RequestBuilder) -> Result<Response> {
        debug!("{} {}{}", method, self.base_url, path);

        let response = request.send().await.map_err(|e| {
            Error::transport(format!("{} {} failed: {}", method, path, e))
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(Error::transport(format!(
            "{} {} returned {}: {}",
            method,
            path,
            status,
            error_detail(&body)
        )))
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        request: RequestBuilder,
    ) -> Result<T> {
        let response = self.send(method.clone(), path, request).await?;
        response.json::<T>().await.map_err(|e| {
            Error::transport(format!("{} {} sent an unreadable body: {}", method, path, e))
        })
    }
}

#[async_trait]
impl TaskGateway for HttpTaskGateway {
    async fn list(&self, query: &TaskQuery) -> Result<Vec<Task>> {
        let request = self.request(Method::GET, "/tasks").query(&query.pairs());
        self.send_json(Method::GET, "/tasks", request).await
    }

    async fn get(&self, id: TaskId) -> Result<Task> {
        let path = format!("/tasks/{}", id);
        let request = self.request(Method::GET, &path);
        self.send_json(Method::GET, &path, request).await
    }

    async fn create(&self, task: &NewTask) -> Result<Task> {
        let request = self.request(Method::POST, "/tasks").json(task);
        self.send_json(Method::POST, "/tasks", request).await
    }

    async fn update(&self, id: TaskId, patch: &TaskPatch) -> Result<Task> {
        let path = format!("/tasks/{}", id);
        let request = self.request(Method::PATCH, &path).json(patch);
        self.send_json(Method::PATCH, &path, request).await
    }

    async fn delete(&self, id: TaskId) -> Result<()> {
        let path = format!("/tasks/{}", id);
        let request = self.request(Method::DELETE, &path);
        self.send(Method::DELETE, &path, request).await?;
        Ok(())
    }
}

/// Pull a readable message out of an error body
///
/// The task store answers errors with `{"detail": ...}`, where `detail` is
/// either a string or a list of validation problems.
fn error_detail(body: &str) -> String {
    if let Ok(json) = serde_json::from_str::<serde_json::Value>(body) {
        match &json["detail"] {
            serde_json::Value::String(detail) => return detail.clone(),
            serde_json::Value::Array(items) => {
                let messages: Vec<&str> = items
                    .iter()
                    .filter_map(|item| item["msg"].as_str())
                    .collect();
                if !messages.is_empty() {
                    return messages.join("; ");
                }
            }
            _ => {}
        }
    }

    let body = body.trim();
    if body.is_empty() {
        return "no details".to_string();
    }
    body.chars().take(MAX_ERROR_BODY).collect()
}
