//! Application state shared by every handler and middleware

use crate::WebResult;
use axum_extra::extract::cookie::CookieJar;
use shopdesk_access::{
    backend_client, Authenticator, AuthorizationStore, HttpAuthenticator, HttpPermissionSource,
    PermissionSource, SessionCookies,
};
use shopdesk_core::AdminConfig;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub struct AppState {
    /// Configuration
    pub config: Arc<AdminConfig>,
    /// Session-scoped permission cache
    pub authz: AuthorizationStore,
    /// Backend login exchange
    pub authenticator: Arc<dyn Authenticator>,
}

impl AppState {
    /// Create state talking to the configured backend over HTTP
    pub fn new(config: AdminConfig) -> WebResult<Self> {
        let client = backend_client(&config.backend)?;
        let source = Arc::new(HttpPermissionSource::new(client.clone(), &config.backend));
        let authenticator = Arc::new(HttpAuthenticator::new(client, &config.backend));

        info!(
            backend = %config.backend.base_url,
            "Application state initialized"
        );
        Ok(Self::with_backends(config, source, authenticator))
    }

    /// Create state over arbitrary backend implementations
    pub fn with_backends(
        config: AdminConfig,
        source: Arc<dyn PermissionSource>,
        authenticator: Arc<dyn Authenticator>,
    ) -> Self {
        let authz = AuthorizationStore::new(source, config.session.ttl());
        Self {
            config: Arc::new(config),
            authz,
            authenticator,
        }
    }

    /// Read the token and username cookies
    pub fn session_cookies(&self, jar: &CookieJar) -> SessionCookies {
        let session = &self.config.session;
        SessionCookies::from_raw(
            jar.get(&session.token_cookie).map(|c| c.value()),
            jar.get(&session.username_cookie).map(|c| c.value()),
        )
    }
}
