//! Shopdesk Web Server
//!
//! Main web server implementation using Axum.

use crate::{create_app, AppState, WebError, WebResult};
use axum::serve;
use shopdesk_core::AdminConfig;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// Main admin gateway server
pub struct ShopdeskServer {
    config: AdminConfig,
    state: AppState,
}

impl ShopdeskServer {
    /// Validate `config` and create a server talking to the configured backend
    pub fn new(config: AdminConfig) -> WebResult<Self> {
        config.validate()?;
        let state = AppState::new(config.clone())?;
        Ok(Self { config, state })
    }

    /// Create a server over prepared state
    pub fn with_state(state: AppState) -> WebResult<Self> {
        state.config.validate()?;
        Ok(Self {
            config: state.config.as_ref().clone(),
            state,
        })
    }

    /// Start the web server
    pub async fn start(self) -> WebResult<()> {
        let address = self.config.address();

        info!("Starting Shopdesk admin gateway");
        info!("Server address: http://{}", address);
        info!("Backend: {}", self.config.backend.base_url);
        info!("Development mode: {}", self.config.server.dev_mode);

        let listener = TcpListener::bind(&address)
            .await
            .map_err(WebError::Server)?;

        self.serve(listener).await
    }

    /// Serve on an already bound listener
    pub async fn serve(self, listener: TcpListener) -> WebResult<()> {
        let app = create_app(self.state.clone());
        let sweeper = spawn_session_sweeper(&self.state);

        if let Ok(address) = listener.local_addr() {
            info!("Server listening on http://{}", address);
        }

        let result = serve(listener, app).await;
        sweeper.abort();

        if let Err(e) = result {
            error!("Server error: {}", e);
            return Err(WebError::Server(e));
        }

        Ok(())
    }

    /// Get server configuration
    pub fn config(&self) -> &AdminConfig {
        &self.config
    }

    /// Get application state
    pub fn state(&self) -> &AppState {
        &self.state
    }
}

/// Evict expired authorization-store entries on the configured interval
fn spawn_session_sweeper(state: &AppState) -> JoinHandle<()> {
    let authz = state.authz.clone();
    let period = state.config.session.sweep_interval();

    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        // The first tick completes immediately.
        interval.tick().await;
        loop {
            interval.tick().await;
            authz.sweep_expired();
        }
    })
}

/// Builder for ShopdeskServer
pub struct ShopdeskServerBuilder {
    config: AdminConfig,
}

impl ShopdeskServerBuilder {
    /// Create a new server builder
    pub fn new() -> Self {
        Self {
            config: AdminConfig::default(),
        }
    }

    /// Start from an existing configuration
    pub fn config(mut self, config: AdminConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the server host
    pub fn host<S: Into<String>>(mut self, host: S) -> Self {
        self.config.server.host = host.into();
        self
    }

    /// Set the server port
    pub fn port(mut self, port: u16) -> Self {
        self.config.server.port = port;
        self
    }

    /// Enable development mode
    pub fn dev_mode(mut self, dev_mode: bool) -> Self {
        self.config.server.dev_mode = dev_mode;
        self
    }

    /// Set the commerce backend base URL
    pub fn backend_url<S: Into<String>>(mut self, url: S) -> Self {
        self.config.backend.base_url = url.into();
        self
    }

    /// Validate the configuration and build the server
    pub fn build(self) -> WebResult<ShopdeskServer> {
        ShopdeskServer::new(self.config)
    }
}

impl Default for ShopdeskServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
