//! Integration test helpers
//!
//! Spawns a fake commerce backend and a gateway pointed at it, both on
//! ephemeral ports.

#![allow(dead_code)]

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use shopdesk_core::AdminConfig;
use shopdesk_web::ShopdeskServer;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, LazyLock};
use tokio::net::TcpListener;

// Initialise tracing once per test binary
static TRACING: LazyLock<()> = LazyLock::new(|| {
    if std::env::var("TEST_LOG").is_ok() {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .finish();
        tracing::subscriber::set_global_default(subscriber).ok();
    } else {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_writer(std::io::sink)
            .finish();
        tracing::subscriber::set_global_default(subscriber).ok();
    }
});

/// Username whose permission lookup always fails with a 500
pub const BROKEN_USER: &str = "broken";
/// Password the fake backend accepts for every user
pub const PASSWORD: &str = "secret";

#[derive(Clone)]
struct BackendState {
    grants: Arc<HashMap<String, Vec<String>>>,
    lookups: Arc<AtomicUsize>,
}

#[derive(Deserialize)]
struct LookupRequest {
    username: String,
}

#[derive(Deserialize)]
struct LoginRequest {
    username: String,
    password: String,
}

async fn lookup(
    State(state): State<BackendState>,
    Json(request): Json<LookupRequest>,
) -> (StatusCode, Json<Value>) {
    state.lookups.fetch_add(1, Ordering::SeqCst);
    if request.username == BROKEN_USER {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "database unavailable" })),
        );
    }
    let permissions = state
        .grants
        .get(&request.username)
        .cloned()
        .unwrap_or_default();
    (StatusCode::OK, Json(json!({ "permissions": permissions })))
}

async fn login(Json(request): Json<LoginRequest>) -> (StatusCode, Json<Value>) {
    if request.password == PASSWORD {
        (
            StatusCode::OK,
            Json(json!({ "token": format!("tok-{}", request.username), "expires_in": 600 })),
        )
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "invalid credentials" })),
        )
    }
}

/// Fake commerce backend
pub struct TestBackend {
    pub address: String,
    lookups: Arc<AtomicUsize>,
}

impl TestBackend {
    /// Permission lookups served so far
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

pub async fn spawn_backend(grants: &[(&str, &[&str])]) -> TestBackend {
    let grants = grants
        .iter()
        .map(|(user, pages)| {
            (
                user.to_string(),
                pages.iter().map(|p| p.to_string()).collect(),
            )
        })
        .collect();
    let lookups = Arc::new(AtomicUsize::new(0));
    let state = BackendState {
        grants: Arc::new(grants),
        lookups: lookups.clone(),
    };

    let app = Router::new()
        .route("/api/business-admin/permissions/lookup", post(lookup))
        .route("/api/business-admin/login", post(login))
        .with_state(state);

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind backend");
    let address = format!("http://{}", listener.local_addr().unwrap());
    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });

    TestBackend { address, lookups }
}

/// Gateway under test
pub struct TestApp {
    pub address: String,
    pub client: reqwest::Client,
    pub backend: TestBackend,
}

impl TestApp {
    /// GET `path` with the given `Cookie` header
    pub async fn get(&self, path: &str, cookie: Option<&str>) -> reqwest::Response {
        let mut request = self.client.get(format!("{}{}", self.address, path));
        if let Some(cookie) = cookie {
            request = request.header(reqwest::header::COOKIE, cookie);
        }
        request.send().await.expect("Failed to execute request.")
    }

    pub async fn post_login(&self, username: &str, password: &str) -> reqwest::Response {
        self.client
            .post(format!("{}/authentication/login/minimal", self.address))
            .form(&[("username", username), ("password", password)])
            .send()
            .await
            .expect("Failed to execute request.")
    }
}

/// Redirect target of a response, if any
pub fn location(response: &reqwest::Response) -> Option<&str> {
    response
        .headers()
        .get(reqwest::header::LOCATION)
        .and_then(|v| v.to_str().ok())
}

/// Spawn a backend granting `grants` and a gateway in front of it
pub async fn spawn_app(grants: &[(&str, &[&str])]) -> TestApp {
    LazyLock::force(&TRACING);

    let backend = spawn_backend(grants).await;

    let mut config = AdminConfig::default();
    config.backend.base_url = backend.address.clone();
    config.backend.timeout_secs = 5;

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind gateway");
    let address = format!("http://{}", listener.local_addr().unwrap());

    let server = ShopdeskServer::new(config).expect("Failed to build server");
    tokio::spawn(async move {
        server.serve(listener).await.ok();
    });

    let client = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap();

    TestApp {
        address,
        client,
        backend,
    }
}
