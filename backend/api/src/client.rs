//! Thin JSON-over-HTTP client for the task backend.
//!
//! Every call goes through [`ApiClient::send`], which turns transport
//! failures and non-2xx responses into [`ClientError`]s. Bodies are handled as
//! `serde_json::Value`; typed views are layered on by the per-area APIs.

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder};
use serde::Serialize;
use serde_json::Value;
use taskflow_config::ClientConfig;
use taskflow_core::{ClientError, Result};
use taskflow_logging::redact_sensitive_data;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Network(format!("failed to build HTTP client: {e}")))?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { http, base_url })
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        Self::new(config.base_url(), config.request_timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn get(&self, path: &str, op: &str) -> Result<Value> {
        self.send(self.request(Method::GET, path), op).await
    }

    pub async fn get_with_query<Q: Serialize + ?Sized>(
        &self,
        path: &str,
        query: &Q,
        op: &str,
    ) -> Result<Value> {
        self.send(self.request(Method::GET, path).query(query), op).await
    }

    pub async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B, op: &str) -> Result<Value> {
        self.send(self.request(Method::POST, path).json(body), op).await
    }

    /// POST with no request body.
    pub async fn post_empty(&self, path: &str, op: &str) -> Result<Value> {
        self.send(self.request(Method::POST, path), op).await
    }

    pub async fn put<B: Serialize + ?Sized>(&self, path: &str, body: &B, op: &str) -> Result<Value> {
        self.send(self.request(Method::PUT, path).json(body), op).await
    }

    pub async fn put_empty(&self, path: &str, op: &str) -> Result<Value> {
        self.send(self.request(Method::PUT, path), op).await
    }

    pub async fn delete(&self, path: &str, op: &str) -> Result<Value> {
        self.send(self.request(Method::DELETE, path), op).await
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http.request(method, self.url(path))
    }

    /// `op` names the operation for the fallback message, e.g. "create task"
    /// gives "Failed to create task" when the backend sends no error text.
    async fn send(&self, request: RequestBuilder, op: &str) -> Result<Value> {
        let response = request.send().await.map_err(|e| transport_error(&e, op))?;
        let status = response.status();
        let body = response.text().await.map_err(|e| transport_error(&e, op))?;
        debug!(op, status = status.as_u16(), bytes = body.len(), "Backend responded");

        if status.is_success() {
            if body.trim().is_empty() {
                return Ok(Value::Null);
            }
            return serde_json::from_str(&body).map_err(|e| {
                ClientError::Application(format!("Failed to {op}: invalid response body: {e}"))
            });
        }

        let message = error_message(&body).unwrap_or_else(|| format!("Failed to {op}"));
        warn!(
            op,
            status = status.as_u16(),
            message = %redact_sensitive_data(&message),
            "Backend request failed"
        );
        Err(ClientError::from_status(status.as_u16(), message))
    }
}

fn transport_error(err: &reqwest::Error, op: &str) -> ClientError {
    let reason = if err.is_timeout() {
        "request timed out"
    } else if err.is_connect() {
        "backend unreachable"
    } else {
        "request failed"
    };
    warn!(op, error = %err, "{reason}");
    ClientError::Network(format!("Failed to {op}: {reason}"))
}

/// Backend errors come back as `{"error": "..."}`, occasionally `{"message": "..."}`.
fn error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    ["error", "message"]
        .iter()
        .find_map(|key| value.get(*key).and_then(Value::as_str))
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
