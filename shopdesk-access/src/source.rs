//! Permission lookup against the commerce backend

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use shopdesk_core::{BackendConfig, ErrorContext, ShopdeskError, ShopdeskResult, Username};
use std::time::Duration;
use tracing::debug;

/// Anything that can list the permission names granted to a user
#[async_trait]
pub trait PermissionSource: Send + Sync {
    /// Permission names for `username`. An absent list is an empty `Vec`,
    /// not an error.
    async fn fetch_permissions(&self, username: &Username) -> ShopdeskResult<Vec<String>>;
}

/// Build the HTTP client shared by every backend call
pub fn backend_client(config: &BackendConfig) -> ShopdeskResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(config.timeout())
        .build()
        .map_err(|e| ShopdeskError::Config {
            message: format!("Failed to build backend HTTP client: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("backend_client").with_operation("build"),
        })
}

/// Translate a reqwest failure into the workspace error model
pub(crate) fn request_error(
    e: reqwest::Error,
    operation: &str,
    url: &str,
    timeout: Duration,
) -> ShopdeskError {
    let context = ErrorContext::new("backend")
        .with_operation(operation)
        .with_metadata("url", url);
    if e.is_timeout() {
        ShopdeskError::Timeout {
            operation: operation.to_string(),
            duration_ms: timeout.as_millis() as u64,
            context,
        }
    } else {
        ShopdeskError::Network {
            message: e.to_string(),
            status: e.status().map(|s| s.as_u16()),
            source: Some(Box::new(e)),
            context,
        }
    }
}

#[derive(Serialize)]
struct PermissionLookupRequest<'a> {
    username: &'a str,
}

/// `POST {"username": ...}` to the permissions endpoint
pub struct HttpPermissionSource {
    client: reqwest::Client,
    url: String,
    field: String,
    timeout: Duration,
}

impl HttpPermissionSource {
    pub fn new(client: reqwest::Client, config: &BackendConfig) -> Self {
        Self {
            client,
            url: config.permissions_url(),
            field: config.permissions_field.clone(),
            timeout: config.timeout(),
        }
    }
}

#[async_trait]
impl PermissionSource for HttpPermissionSource {
    async fn fetch_permissions(&self, username: &Username) -> ShopdeskResult<Vec<String>> {
        debug!(username = %username, url = %self.url, "Fetching permissions");

        let response = self
            .client
            .post(&self.url)
            .json(&PermissionLookupRequest {
                username: username.as_str(),
            })
            .send()
            .await
            .map_err(|e| request_error(e, "fetch_permissions", &self.url, self.timeout))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ShopdeskError::Network {
                message: format!("permissions endpoint answered {}", status),
                status: Some(status.as_u16()),
                source: None,
                context: ErrorContext::new("permission_source")
                    .with_operation("fetch_permissions")
                    .with_metadata("username", username.as_str()),
            });
        }

        let body: Value = response.json().await.map_err(|e| {
            ShopdeskError::MalformedResponse {
                message: format!("permissions body is not JSON: {}", e),
                context: ErrorContext::new("permission_source")
                    .with_operation("fetch_permissions"),
            }
        })?;

        extract_permission_names(&body, &self.field)
    }
}

/// Pull the list under `field` out of a permissions response.
///
/// A missing or null field yields an empty list; anything else that is not an
/// array of strings is malformed.
pub fn extract_permission_names(body: &Value, field: &str) -> ShopdeskResult<Vec<String>> {
    let malformed = |message: String| ShopdeskError::MalformedResponse {
        message,
        context: ErrorContext::new("permission_source").with_operation("parse_permissions"),
    };

    let object = body
        .as_object()
        .ok_or_else(|| malformed("permissions body is not a JSON object".to_string()))?;

    match object.get(field) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| {
                item.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| malformed(format!("non-string entry in '{}'", field)))
            })
            .collect(),
        Some(other) => Err(malformed(format!(
            "'{}' should be an array, found {}",
            field, other
        ))),
    }
}
