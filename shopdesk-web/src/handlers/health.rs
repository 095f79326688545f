//! Health check handlers

use crate::AppState;
use axum::{extract::State, response::Json};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
    /// Sessions currently held by the authorization store
    pub sessions: usize,
    /// Permission lookups sent to the backend since start
    pub permission_lookups: u64,
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: Utc::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        sessions: state.authz.session_count(),
        permission_lookups: state.authz.fetch_count(),
    })
}
