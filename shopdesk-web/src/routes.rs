//! Route definitions for the admin gateway

use crate::{
    handlers,
    middleware::{permission_gate, session_guard},
    pages::{AdminPage, ADMIN_PAGES},
    AppState,
};
use axum::{
    extract::{Request, State},
    middleware::{self, Next},
    routing::{get, MethodRouter},
    Extension, Router,
};
use axum_extra::extract::cookie::CookieJar;
use shopdesk_access::SessionCookies;
use shopdesk_core::PageId;
use tower_http::services::ServeDir;

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health_check))
}

/// Routes reachable without a session
pub fn public_routes(state: &AppState) -> Router<AppState> {
    let routes = &state.config.routes;
    Router::new()
        .route(
            &routes.login_path,
            get(handlers::auth::login_page).post(handlers::auth::login_submit),
        )
        .route(&routes.logout_path, get(handlers::auth::logout))
        .route(&routes.forbidden_path, get(handlers::forbidden))
}

/// Every admin page, behind the session guard and its own permission gate
pub fn admin_routes(state: &AppState) -> Router<AppState> {
    ADMIN_PAGES
        .iter()
        .fold(Router::new(), |router, page| {
            router.route(page.path, page_route(state, page))
        })
        .route_layer(middleware::from_fn_with_state(state.clone(), session_guard))
}

fn page_route(state: &AppState, page: &'static AdminPage) -> MethodRouter<AppState> {
    let route = get(
        move |State(state): State<AppState>, Extension(session): Extension<SessionCookies>| {
            handlers::pages::render_page(state, page, session)
        },
    );

    match page.page_id {
        Some(id) => gated(state, id, route),
        None => route,
    }
}

fn gated(
    state: &AppState,
    page_id: &'static str,
    route: MethodRouter<AppState>,
) -> MethodRouter<AppState> {
    route.route_layer(middleware::from_fn_with_state(
        state.clone(),
        move |State(state): State<AppState>, jar: CookieJar, request: Request, next: Next| {
            permission_gate(state, PageId::from(page_id), jar, request, next)
        },
    ))
}

/// Static assets for the page shells
pub fn static_service() -> ServeDir {
    ServeDir::new(concat!(env!("CARGO_MANIFEST_DIR"), "/static"))
}
