//! Access middleware for the admin pages
//!
//! `session_guard` wraps the whole admin router. `permission_gate` is attached
//! per route with the page identifier that route declares.

use crate::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use shopdesk_access::{GateState, PermissionGate, SessionCookies, SessionDecision, SessionGuard};
use shopdesk_core::PageId;
use tracing::{debug, info};

/// Redirect to the login screen when no session token is present.
///
/// On success the parsed cookies are stored in the request extensions for the
/// gate and the handlers.
pub async fn session_guard(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let cookies = state.session_cookies(&jar);

    match SessionGuard.check(&cookies) {
        SessionDecision::Proceed => {
            request.extensions_mut().insert(cookies);
            next.run(request).await
        }
        SessionDecision::RedirectToLogin => {
            debug!(path = %request.uri().path(), "No session token, redirecting to login");
            Redirect::to(&state.config.routes.login_path).into_response()
        }
    }
}

/// Resolve `page` for the current user; run the handler only when allowed.
pub async fn permission_gate(
    state: AppState,
    page: PageId,
    jar: CookieJar,
    request: Request,
    next: Next,
) -> Response {
    let cookies = request
        .extensions()
        .get::<SessionCookies>()
        .cloned()
        .unwrap_or_else(|| state.session_cookies(&jar));

    let mut gate = PermissionGate::new(page);
    match gate.resolve(&state.authz, &cookies).await {
        GateState::Allowed => next.run(request).await,
        GateState::Denied(reason) => {
            info!(
                page = %gate.page(),
                username = ?cookies.username.as_ref().map(|u| u.as_str()),
                reason = reason.as_str(),
                "Access denied"
            );
            Redirect::to(&state.config.routes.forbidden_path).into_response()
        }
        // resolve() always ends in a terminal state; deny if that ever changes.
        GateState::Pending => Redirect::to(&state.config.routes.forbidden_path).into_response(),
    }
}
