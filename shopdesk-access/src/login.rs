//! Credential exchange with the backend login endpoint

use crate::source::request_error;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shopdesk_core::{
    BackendConfig, ErrorContext, SessionToken, ShopdeskError, ShopdeskResult, Username,
};
use std::time::Duration;
use tracing::{debug, warn};

/// What the login form submits
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: Username,
    pub password: String,
}

/// Session issued by the backend for accepted credentials
#[derive(Debug, Clone)]
pub struct LoginGrant {
    pub token: SessionToken,
    /// Lifetime in seconds, when the backend states one
    pub expires_in: Option<u64>,
}

/// Exchanges credentials for a session token
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn login(&self, credentials: &Credentials) -> ShopdeskResult<LoginGrant>;
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct LoginResponse {
    token: Option<String>,
    expires_in: Option<u64>,
}

/// `POST {"username","password"}` to the backend login endpoint
pub struct HttpAuthenticator {
    client: reqwest::Client,
    url: String,
    timeout: Duration,
}

impl HttpAuthenticator {
    pub fn new(client: reqwest::Client, config: &BackendConfig) -> Self {
        Self {
            client,
            url: config.login_url(),
            timeout: config.timeout(),
        }
    }
}

#[async_trait]
impl Authenticator for HttpAuthenticator {
    async fn login(&self, credentials: &Credentials) -> ShopdeskResult<LoginGrant> {
        debug!(username = %credentials.username, "Forwarding login");

        let response = self
            .client
            .post(&self.url)
            .json(&LoginRequest {
                username: credentials.username.as_str(),
                password: &credentials.password,
            })
            .send()
            .await
            .map_err(|e| request_error(e, "login", &self.url, self.timeout))?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            warn!(username = %credentials.username, "Backend rejected credentials");
            return Err(ShopdeskError::Authentication {
                message: "invalid username or password".to_string(),
                context: ErrorContext::new("authenticator").with_operation("login"),
            });
        }
        if !status.is_success() {
            return Err(ShopdeskError::Network {
                message: format!("login endpoint answered {}", status),
                status: Some(status.as_u16()),
                source: None,
                context: ErrorContext::new("authenticator").with_operation("login"),
            });
        }

        let body: LoginResponse =
            response
                .json()
                .await
                .map_err(|e| ShopdeskError::MalformedResponse {
                    message: format!("login body: {}", e),
                    context: ErrorContext::new("authenticator").with_operation("login"),
                })?;

        let token = body
            .token
            .as_deref()
            .and_then(SessionToken::parse)
            .ok_or_else(|| ShopdeskError::MalformedResponse {
                message: "login response carries no token".to_string(),
                context: ErrorContext::new("authenticator").with_operation("login"),
            })?;

        Ok(LoginGrant {
            token,
            expires_in: body.expires_in,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::backend_client;
    use axum::{http::StatusCode, routing::post, Json, Router};
    use serde_json::{json, Value};
    use tokio::net::TcpListener;

    async fn authenticator_for(router: Router) -> HttpAuthenticator {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        let config = BackendConfig {
            base_url: format!("http://{}", address),
            login_path: "/login".to_string(),
            ..BackendConfig::default()
        };
        HttpAuthenticator::new(backend_client(&config).unwrap(), &config)
    }

    fn credentials(password: &str) -> Credentials {
        Credentials {
            username: Username::parse("alice").unwrap(),
            password: password.to_string(),
        }
    }

    fn backend() -> Router {
        Router::new().route(
            "/login",
            post(|Json(body): Json<Value>| async move {
                if body["password"] == "secret" {
                    (
                        StatusCode::OK,
                        Json(json!({"token": "issued-token", "expires_in": 3600})),
                    )
                } else {
                    (StatusCode::UNAUTHORIZED, Json(json!({"error": "nope"})))
                }
            }),
        )
    }

    #[tokio::test]
    async fn test_accepted_credentials_yield_token() {
        let auth = authenticator_for(backend()).await;
        let grant = auth.login(&credentials("secret")).await.unwrap();
        assert_eq!(grant.token.as_str(), "issued-token");
        assert_eq!(grant.expires_in, Some(3600));
    }

    #[tokio::test]
    async fn test_rejected_credentials_are_authentication_error() {
        let auth = authenticator_for(backend()).await;
        let err = auth.login(&credentials("wrong")).await.unwrap_err();
        assert!(matches!(err, ShopdeskError::Authentication { .. }));
    }

    #[tokio::test]
    async fn test_missing_token_is_malformed() {
        let router = Router::new().route("/login", post(|| async { Json(json!({})) }));
        let auth = authenticator_for(router).await;
        let err = auth.login(&credentials("secret")).await.unwrap_err();
        assert!(matches!(err, ShopdeskError::MalformedResponse { .. }));
    }
}
