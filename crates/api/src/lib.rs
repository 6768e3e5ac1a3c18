//! n8n public API client.
//!
//! This crate is the transport layer of the MCP server. Each operation on
//! [`WorkflowApi`] performs exactly one HTTP round trip against
//! `<base>/api/v1` and normalizes the outcome:
//!
//! - status >= 400 becomes [`N8nApiError::Remote`] with the raw body
//! - an empty or whitespace-only body becomes `None`
//! - anything else is parsed as JSON
//!
//! Nothing is retried and nothing is cached.
//!
//! # Example
//!
//! ```ignore
//! use n8n_mcp_api::{N8nClient, WorkflowApi};
//!
//! let client = N8nClient::from_env()?;
//! let workflows = client.list_workflows().await?;
//! ```

mod config;
mod error;

use std::time::Instant;

use async_trait::async_trait;
use n8n_mcp_types::{WorkflowBody, WorkflowId};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use reqwest::{Client, Method, header};
use serde_json::Value;
use tracing::{debug, warn};

pub use config::{API_KEY_ENV, BASE_URL_ENV, ConfigOverrides, DEFAULT_BASE_URL, DEFAULT_TIMEOUT, N8nConfig, TIMEOUT_ENV};
pub use error::N8nApiError;

/// Versioned prefix of the n8n public REST API.
pub const API_PREFIX: &str = "/api/v1";
/// Header carrying the n8n API key (`X-N8N-API-KEY`).
pub const API_KEY_HEADER: &str = "x-n8n-api-key";

/// Identifier characters left as-is in path segments.
const ID_SEGMENT_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.').remove(b'~');

/// Remote workflow operations.
///
/// `Ok(None)` means the server answered successfully with an empty body.
#[async_trait]
pub trait WorkflowApi: Send + Sync {
    /// `POST /workflows`
    async fn create_workflow(&self, body: &WorkflowBody) -> Result<Option<Value>, N8nApiError>;

    /// `GET /workflows/{id}`
    async fn get_workflow(&self, id: &WorkflowId) -> Result<Option<Value>, N8nApiError>;

    /// `GET /workflows`
    async fn list_workflows(&self) -> Result<Option<Value>, N8nApiError>;

    /// `PATCH /workflows/{id}`
    async fn update_workflow(&self, id: &WorkflowId, body: &WorkflowBody) -> Result<Option<Value>, N8nApiError>;

    /// `DELETE /workflows/{id}`. An empty response yields
    /// `{"deleted": true, "id": "<id>"}`.
    async fn delete_workflow(&self, id: &WorkflowId) -> Result<Value, N8nApiError>;

    /// `POST /workflows/{id}/activate` or `POST /workflows/{id}/deactivate`.
    async fn set_activation(&self, id: &WorkflowId, active: bool) -> Result<Option<Value>, N8nApiError>;
}

/// Confirmation returned for a delete that produced no response body.
pub fn deletion_confirmation(id: &WorkflowId) -> Value {
    serde_json::json!({ "deleted": true, "id": id.to_string() })
}

/// Thin wrapper around a configured `reqwest::Client` for the n8n API.
///
/// The client pre-configures the JSON `accept`/`content-type` headers, the
/// API key header, and the request timeout.
#[derive(Debug, Clone)]
pub struct N8nClient {
    base_url: String,
    http: Client,
}

impl N8nClient {
    /// Construct a client from an explicit configuration.
    pub fn new(config: &N8nConfig) -> Result<Self, N8nApiError> {
        let mut api_key = header::HeaderValue::from_str(config.api_key())
            .map_err(|error| N8nApiError::config(format!("{API_KEY_ENV} is not a valid header value: {error}")))?;
        api_key.set_sensitive(true);

        let json = header::HeaderValue::from_static("application/json");
        let mut default_headers = header::HeaderMap::new();
        default_headers.insert(header::ACCEPT, json.clone());
        default_headers.insert(header::CONTENT_TYPE, json);
        default_headers.insert(header::HeaderName::from_static(API_KEY_HEADER), api_key);

        let http = Client::builder()
            .default_headers(default_headers)
            .timeout(config.timeout())
            .build()?;

        debug!(base_url = %config.base_url(), timeout_secs = config.timeout().as_secs(), "n8n client configured");
        Ok(Self {
            base_url: config.base_url().to_string(),
            http,
        })
    }

    /// Construct a client from `N8N_BASE`, `N8N_API_KEY` and `N8N_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self, N8nApiError> {
        Self::new(&N8nConfig::from_env()?)
    }

    /// Resolve an API-relative path against `<base>/api/v1`.
    pub fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{API_PREFIX}{path}", self.base_url)
        } else {
            format!("{}{API_PREFIX}/{path}", self.base_url)
        }
    }

    async fn send(&self, method: Method, path: &str, body: Option<&WorkflowBody>) -> Result<Option<Value>, N8nApiError> {
        let start = Instant::now();
        let url = self.url(path);
        debug!(method = %method, url = %url, has_body = body.is_some(), "n8n request started");

        let mut request_builder = self.http.request(method.clone(), &url);
        if let Some(body) = body {
            request_builder = request_builder.json(body);
        }

        let response = request_builder.send().await?;
        let status = response.status();
        let body_text = response.text().await?;

        if status.as_u16() >= 400 {
            warn!(
                method = %method,
                url = %url,
                status = status.as_u16(),
                duration_ms = start.elapsed().as_millis(),
                "n8n request rejected"
            );
            return Err(N8nApiError::Remote {
                status: status.as_u16(),
                body: body_text,
            });
        }

        if body_text.trim().is_empty() {
            debug!(
                method = %method,
                url = %url,
                status = status.as_u16(),
                duration_ms = start.elapsed().as_millis(),
                "n8n request completed with empty response"
            );
            return Ok(None);
        }

        let parsed = serde_json::from_str::<Value>(&body_text).map_err(|source| N8nApiError::Decode {
            status: status.as_u16(),
            source,
            body_preview: error::truncate_body_preview(&body_text, 200),
        })?;
        debug!(
            method = %method,
            url = %url,
            status = status.as_u16(),
            duration_ms = start.elapsed().as_millis(),
            "n8n request completed"
        );
        Ok(Some(parsed))
    }
}

fn workflow_path(id: &WorkflowId) -> String {
    let segment = id.to_string();
    format!("/workflows/{}", utf8_percent_encode(&segment, ID_SEGMENT_ENCODE_SET))
}

fn activation_path(id: &WorkflowId, active: bool) -> String {
    let action = if active { "activate" } else { "deactivate" };
    format!("{}/{action}", workflow_path(id))
}

#[async_trait]
impl WorkflowApi for N8nClient {
    async fn create_workflow(&self, body: &WorkflowBody) -> Result<Option<Value>, N8nApiError> {
        self.send(Method::POST, "/workflows", Some(body)).await
    }

    async fn get_workflow(&self, id: &WorkflowId) -> Result<Option<Value>, N8nApiError> {
        self.send(Method::GET, &workflow_path(id), None).await
    }

    async fn list_workflows(&self) -> Result<Option<Value>, N8nApiError> {
        self.send(Method::GET, "/workflows", None).await
    }

    async fn update_workflow(&self, id: &WorkflowId, body: &WorkflowBody) -> Result<Option<Value>, N8nApiError> {
        self.send(Method::PATCH, &workflow_path(id), Some(body)).await
    }

    async fn delete_workflow(&self, id: &WorkflowId) -> Result<Value, N8nApiError> {
        let deleted = self.send(Method::DELETE, &workflow_path(id), None).await?;
        Ok(deleted.unwrap_or_else(|| deletion_confirmation(id)))
    }

    async fn set_activation(&self, id: &WorkflowId, active: bool) -> Result<Option<Value>, N8nApiError> {
        self.send(Method::POST, &activation_path(id, active), None).await
    }
}
