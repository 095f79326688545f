//! Admin page shells and the status pages

use super::render;
use crate::{
    pages::AdminPage,
    templates::{PageTemplate, StatusTemplate},
    AppState,
};
use axum::{extract::State, http::StatusCode, response::Response};
use shopdesk_access::SessionCookies;

/// Render the shell of an admin page the user has been let through to
pub async fn render_page(
    state: AppState,
    page: &'static AdminPage,
    session: SessionCookies,
) -> Response {
    let template = PageTemplate::new(
        page,
        session.username.as_ref().map(|u| u.as_str()),
        &state.config.routes.logout_path,
    );
    render(StatusCode::OK, &template)
}

/// Landing page for denied navigations
pub async fn forbidden(State(state): State<AppState>) -> Response {
    render(
        StatusCode::FORBIDDEN,
        &StatusTemplate::new(
            StatusCode::FORBIDDEN,
            "You do not have permission to open this page.",
            &state.config.routes.home_path,
        ),
    )
}

/// Fallback for unknown paths
pub async fn not_found(State(state): State<AppState>) -> Response {
    render(
        StatusCode::NOT_FOUND,
        &StatusTemplate::new(
            StatusCode::NOT_FOUND,
            "The page you are looking for does not exist.",
            &state.config.routes.home_path,
        ),
    )
}
