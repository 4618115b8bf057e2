//! Shared helpers for the API integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use mineruca_api::auth::jwt::JwtConfig;
use mineruca_api::auth::password::hash_password;
use mineruca_api::config::ServerConfig;
use mineruca_api::notifications::NotificationRouter;
use mineruca_api::router::build_app_router;
use mineruca_api::state::AppState;
use mineruca_api::ws::WsManager;
use mineruca_core::search::{RestaurantSearchProvider, SearchOrchestrator};
use mineruca_db::models::user::{CreateUser, User};
use mineruca_db::repositories::UserRepo;
use mineruca_events::EventBus;
use mineruca_gourmet::GourmetConfig;
use sqlx::PgPool;
use tower::ServiceExt;

pub const TEST_PASSWORD: &str = "test_password_123";

/// Server configuration for tests: no external services configured.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 5,
        allow_signup: true,
        share_default_expiry_days: 7,
        share_max_expiry_days: 90,
        search_session_ttl_secs: 600,
        chat_history_limit: 20,
        jwt: JwtConfig {
            secret: "integration-test-secret".to_string(),
            access_token_expiry_mins: 15,
            refresh_token_expiry_days: 7,
        },
        gourmet: GourmetConfig::default(),
    }
}

/// Application state over `pool` with the default (unconfigured) clients.
pub fn test_state(pool: PgPool, config: ServerConfig) -> AppState {
    AppState::new(
        pool,
        Arc::new(config),
        Arc::new(WsManager::new()),
        Arc::new(EventBus::default()),
    )
    .expect("test state should build")
}

/// The full application router, same middleware as production.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    let state = test_state(pool, config.clone());
    build_app_router(state, &config)
}

/// Like [`build_test_app`] with the notification router running, so domain
/// events turn into notification rows.
pub fn build_test_app_with_notifications(pool: PgPool) -> Router {
    let config = test_config();
    let state = test_state(pool, config.clone());
    let router = NotificationRouter::new(state.pool.clone(), Arc::clone(&state.ws_manager));
    tokio::spawn(router.run(state.event_bus.subscribe()));
    build_app_router(state, &config)
}

/// Like [`build_test_app`] but with the given search providers.
pub fn build_test_app_with_providers(
    pool: PgPool,
    primary: Arc<dyn RestaurantSearchProvider>,
    fallback: Arc<dyn RestaurantSearchProvider>,
) -> Router {
    let config = test_config();
    let mut state = test_state(pool, config.clone());
    state.search = Arc::new(SearchOrchestrator::new(primary, fallback));
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// Insert a user directly, bypassing signup.
pub async fn create_test_user(pool: &PgPool, username: &str, role: &str) -> User {
    let input = CreateUser {
        username: username.to_string(),
        email: format!("{username}@test.com"),
        password_hash: hash_password(TEST_PASSWORD).expect("hashing should succeed"),
        role: role.to_string(),
    };
    UserRepo::create(pool, &input)
        .await
        .expect("user creation should succeed")
}

/// Log in through the API and return the access token.
pub async fn login(app: Router, username: &str) -> String {
    let body = serde_json::json!({ "username": username, "password": TEST_PASSWORD });
    let response = post_json(app, "/api/v1/auth/login", body).await;
    assert_eq!(response.status(), StatusCode::OK, "login should succeed");
    let json = body_json(response).await;
    json["access_token"]
        .as_str()
        .expect("access_token present")
        .to_string()
}

/// Create a user and log them in. Returns `(user, access_token)`.
pub async fn user_with_token(pool: &PgPool, app: Router, username: &str) -> (User, String) {
    let user = create_test_user(pool, username, "user").await;
    let token = login(app, username).await;
    (user, token)
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::POST, uri, None, Some(body)).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

pub async fn post_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), None).await
}

pub async fn patch_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(app, Method::PATCH, uri, Some(token), Some(body)).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, Some(token), None).await
}

/// Poll `uri` until `done` accepts the JSON body. Events are delivered
/// asynchronously, so assertions on their effects need a short wait.
pub async fn eventually(
    app: Router,
    uri: &str,
    token: &str,
    done: impl Fn(&serde_json::Value) -> bool,
) -> serde_json::Value {
    let mut last = serde_json::Value::Null;
    for _ in 0..50 {
        last = body_json(get_auth(app.clone(), uri, token).await).await;
        if done(&last) {
            return last;
        }
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    }
    panic!("condition not met for {uri}, last body: {last}");
}

/// Collect a response body as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
