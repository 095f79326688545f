//! Login and logout handlers
//!
//! The login form posts credentials to the backend. A granted token is stored
//! in the `token` cookie next to the `username` cookie, and the authorization
//! store gets a fresh entry for that session.

use super::render;
use crate::{templates::LoginTemplate, AppState};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Form,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use shopdesk_access::{token::inspect, Credentials, LoginGrant};
use shopdesk_core::{SessionKey, ShopdeskError, Username};
use tracing::{debug, info, warn};

/// Login form fields
#[derive(Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Show the login form, or go home when the current token is still valid
pub async fn login_page(State(state): State<AppState>, jar: CookieJar) -> Response {
    let cookies = state.session_cookies(&jar);

    if let Some(token) = &cookies.token {
        let status = inspect(token);
        debug!(?status, "Token present on public route");
        if status.is_active() {
            return Redirect::to(&state.config.routes.home_path).into_response();
        }
    }

    render(
        StatusCode::OK,
        &LoginTemplate::new(&state.config.routes.login_path, "", None),
    )
}

/// Exchange credentials for a session
pub async fn login_submit(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Response {
    let login_path = &state.config.routes.login_path;

    let Some(username) = Username::parse(&form.username) else {
        return render(
            StatusCode::BAD_REQUEST,
            &LoginTemplate::new(login_path, &form.username, Some("Username is required")),
        );
    };

    let credentials = Credentials {
        username: username.clone(),
        password: form.password,
    };

    match state.authenticator.login(&credentials).await {
        Ok(grant) => {
            let jar = start_session(&state, jar, &username, &grant);
            info!(username = %username, "Login succeeded");
            (jar, Redirect::to(&state.config.routes.home_path)).into_response()
        }
        Err(e) => {
            let (status, message) = match &e {
                ShopdeskError::Authentication { .. } => {
                    info!(username = %username, "Login rejected");
                    (StatusCode::UNAUTHORIZED, "Invalid username or password")
                }
                _ => {
                    warn!(username = %username, error = %e, "Login backend unavailable");
                    (
                        StatusCode::BAD_GATEWAY,
                        "The login service is unavailable, please try again",
                    )
                }
            };
            render(
                status,
                &LoginTemplate::new(login_path, username.as_str(), Some(message)),
            )
        }
    }
}

/// Drop the session cookies and the session's store entry
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> Response {
    let cookies = state.session_cookies(&jar);

    if let Some(token) = &cookies.token {
        let closed = state.authz.close_token(token);
        info!(
            username = ?cookies.username.as_ref().map(|u| u.as_str()),
            closed,
            "Logout"
        );
    }

    let session = &state.config.session;
    let jar = jar
        .remove(Cookie::build((session.token_cookie.clone(), "")).path("/"))
        .remove(Cookie::build((session.username_cookie.clone(), "")).path("/"));

    (jar, Redirect::to(&state.config.routes.login_path)).into_response()
}

fn start_session(
    state: &AppState,
    jar: CookieJar,
    username: &Username,
    grant: &LoginGrant,
) -> CookieJar {
    // A previous session in this browser must not leak its permissions.
    if let Some(previous) = state.session_cookies(&jar).token {
        state.authz.close_token(&previous);
    }
    state
        .authz
        .open_session(SessionKey::new(grant.token.clone(), username.clone()));

    let session = &state.config.session;
    let lifetime = grant.expires_in.unwrap_or(session.ttl_secs);

    jar.add(session_cookie(
        state,
        session.token_cookie.clone(),
        grant.token.as_str().to_string(),
        lifetime,
    ))
    .add(session_cookie(
        state,
        session.username_cookie.clone(),
        username.as_str().to_string(),
        lifetime,
    ))
}

fn session_cookie(
    state: &AppState,
    name: String,
    value: String,
    lifetime_secs: u64,
) -> Cookie<'static> {
    let max_age = time::Duration::seconds(i64::try_from(lifetime_secs).unwrap_or(i64::MAX));
    Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(state.config.session.secure_cookies)
        .max_age(max_age)
        .build()
}
