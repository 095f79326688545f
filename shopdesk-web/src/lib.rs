//! Shopdesk Web Gateway
//!
//! Serves the admin section of the commerce catalog. Every admin page sits
//! behind the session guard; catalog and business-admin pages add a
//! permission gate naming their page identifier.

pub mod handlers;
pub mod middleware;
pub mod pages;
pub mod routes;
pub mod server;
pub mod state;
pub mod templates;

// Re-export main types
pub use server::ShopdeskServer;
pub use state::AppState;

use axum::{extract::DefaultBodyLimit, Router};
use shopdesk_core::ShopdeskError;
use tower_http::trace::TraceLayer;

/// Create the main application router
pub fn create_app(state: AppState) -> Router {
    Router::new()
        // API routes
        .nest("/api", routes::api_routes())
        // Login, logout and the forbidden page
        .merge(routes::public_routes(&state))
        // Admin pages behind the session guard
        .merge(routes::admin_routes(&state))
        // Static assets
        .nest_service("/static", routes::static_service())
        .fallback(handlers::not_found)
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(64 * 1024))
        .with_state(state)
}

/// Error types for the web server
#[derive(thiserror::Error, Debug)]
pub enum WebError {
    #[error("Server error: {0}")]
    Server(#[from] std::io::Error),

    #[error(transparent)]
    Core(#[from] ShopdeskError),
}

/// Result type for web operations
pub type WebResult<T> = Result<T, WebError>;
