//! HTTP transport boundary.

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use crate::error::{ApiError, ApiResult};
use crate::query::Query;
use crate::session::Session;

/// The contract the toolkit expects from its HTTP collaborator.
///
/// Returns parsed JSON on 2xx and an [`ApiError`] otherwise. Implemented by
/// [`HttpClient`] in production and by in-memory mocks in tests.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, path: &str, query: &Query) -> ApiResult<Value>;
    async fn post(&self, path: &str, body: &Value) -> ApiResult<Value>;
    async fn put(&self, path: &str, body: &Value) -> ApiResult<Value>;
    async fn delete(&self, path: &str) -> ApiResult<Value>;
}

/// reqwest-backed [`Transport`] with bearer auth from the shared [`Session`].
pub struct HttpClient {
    base_url: String,
    client: reqwest::Client,
    session: Session,
}

impl HttpClient {
    /// Create a client for the given backend base URL (e.g. `http://host:8000`).
    pub fn new(base_url: impl Into<String>, session: Session) -> ApiResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
            session,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let mut builder = self.client.request(method, self.url(path));
        if let Some(token) = self.session.token() {
            builder = builder.bearer_auth(token);
        }
        builder
    }

    async fn send(&self, builder: reqwest::RequestBuilder) -> ApiResult<Value> {
        let response = builder.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = error_message(&body)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("Request failed").to_string());
            debug!(status = status.as_u16(), %message, "request failed");
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        if body.is_empty() {
            // DELETE endpoints respond 204 with no body
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&body)?)
    }
}

/// Extract a human-readable message from an error body. The backend uses
/// `{"detail": ...}`; `{"message": ...}` is tolerated.
fn error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value
        .get("detail")
        .or_else(|| value.get("message"))
        .and_then(|v| v.as_str())
        .map(String::from)
}

#[async_trait]
impl Transport for HttpClient {
    async fn get(&self, path: &str, query: &Query) -> ApiResult<Value> {
        debug!(%path, query = %query.to_query_string(), "GET");
        let builder = self.request(reqwest::Method::GET, path).query(&query.pairs());
        self.send(builder).await
    }

    async fn post(&self, path: &str, body: &Value) -> ApiResult<Value> {
        debug!(%path, "POST");
        let builder = self.request(reqwest::Method::POST, path).json(body);
        self.send(builder).await
    }

    async fn put(&self, path: &str, body: &Value) -> ApiResult<Value> {
        debug!(%path, "PUT");
        let builder = self.request(reqwest::Method::PUT, path).json(body);
        self.send(builder).await
    }

    async fn delete(&self, path: &str) -> ApiResult<Value> {
        debug!(%path, "DELETE");
        let builder = self.request(reqwest::Method::DELETE, path);
        self.send(builder).await
    }
}
