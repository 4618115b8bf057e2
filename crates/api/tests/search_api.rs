//! Search sessions with stub providers.

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::http::StatusCode;
use common::{body_json, get_auth, post_auth, post_json_auth};
use mineruca_core::search::{
    FallbackResult, PrimaryResult, ProviderError, RestaurantSearchProvider, SearchQuery,
    SearchResult,
};
use serde_json::json;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Stub providers
// ---------------------------------------------------------------------------

struct Stub {
    name: &'static str,
    response: Result<Vec<SearchResult>, ProviderError>,
    delay: Duration,
    calls: AtomicUsize,
}

impl Stub {
    fn new(name: &'static str, response: Result<Vec<SearchResult>, ProviderError>) -> Arc<Self> {
        Self::delayed(name, response, Duration::ZERO)
    }

    fn delayed(
        name: &'static str,
        response: Result<Vec<SearchResult>, ProviderError>,
        delay: Duration,
    ) -> Arc<Self> {
        Arc::new(Self {
            name,
            response,
            delay,
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RestaurantSearchProvider for Stub {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn search(&self, _query: &SearchQuery) -> Result<Vec<SearchResult>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.response.clone()
    }
}

fn shop(name: &str, prefecture: &str) -> SearchResult {
    SearchResult::Primary(PrimaryResult {
        id: format!("J{name}"),
        name: name.to_string(),
        address: format!("{prefecture}港区"),
        prefecture: Some(prefecture.to_string()),
        city: Some("港区".to_string()),
        hours: String::new(),
        url: None,
        genre: None,
        catch_phrase: None,
        photo_url: None,
        coordinates: None,
        price_range: None,
    })
}

fn found(name: &str, prefecture: &str) -> SearchResult {
    SearchResult::Fallback(FallbackResult {
        name: name.to_string(),
        address: format!("{prefecture}港区"),
        prefecture: Some(prefecture.to_string()),
        city: None,
        hours: String::new(),
        website: None,
        genre: None,
        sources: Vec::new(),
    })
}

fn tokyo() -> serde_json::Value {
    json!({ "prefecture": "東京都", "keyword": "ラーメン" })
}

async fn search_log_count(pool: &PgPool) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM search_logs")
        .fetch_one(pool)
        .await
        .unwrap()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn primary_hit_skips_fallback(pool: PgPool) {
    let primary = Stub::new("hotpepper", Ok(vec![shop("A", "東京都"), shop("B", "神奈川県")]));
    let fallback = Stub::new("gemini", Ok(vec![found("C", "東京都")]));
    let app =
        common::build_test_app_with_providers(pool.clone(), primary.clone(), fallback.clone());
    let (_, token) = common::user_with_token(&pool, app.clone(), "searcher").await;

    let response = post_json_auth(app, "/api/v1/search", tokyo(), &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;

    assert_eq!(json["data"]["phase"], "done");
    assert_eq!(json["data"]["fallback_used"], false);
    // Out-of-prefecture results are dropped.
    let results = json["data"]["results"].as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["source"], "hotpepper");
    assert_eq!(fallback.calls(), 0);
    assert_eq!(search_log_count(&pool).await, 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn empty_primary_falls_back(pool: PgPool) {
    let primary = Stub::new("hotpepper", Ok(vec![]));
    let fallback = Stub::new("gemini", Ok(vec![found("C", "東京都")]));
    let app =
        common::build_test_app_with_providers(pool.clone(), primary.clone(), fallback.clone());
    let (_, token) = common::user_with_token(&pool, app.clone(), "searcher").await;

    let json = body_json(post_json_auth(app, "/api/v1/search", tokyo(), &token).await).await;

    assert_eq!(json["data"]["fallback_used"], true);
    assert_eq!(json["data"]["results"][0]["source"], "ai");
    assert!(json["data"]["error"].is_null());
    assert_eq!(fallback.calls(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn both_failing_reports_error(pool: PgPool) {
    let primary = Stub::new("hotpepper", Err(ProviderError::new("hotpepper", "timeout")));
    let fallback = Stub::new("gemini", Err(ProviderError::new("gemini", "quota")));
    let app = common::build_test_app_with_providers(pool.clone(), primary, fallback);
    let (_, token) = common::user_with_token(&pool, app.clone(), "searcher").await;

    let json = body_json(post_json_auth(app, "/api/v1/search", tokyo(), &token).await).await;

    assert!(json["data"]["error"].is_string());
    assert!(json["data"]["results"].as_array().unwrap().is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn manual_fallback_before_primary_runs_once(pool: PgPool) {
    let primary = Stub::delayed("hotpepper", Ok(vec![]), Duration::from_millis(200));
    let fallback = Stub::new("gemini", Ok(vec![found("C", "東京都")]));
    let app =
        common::build_test_app_with_providers(pool.clone(), primary.clone(), fallback.clone());
    let (_, token) = common::user_with_token(&pool, app.clone(), "searcher").await;

    let mut body = tokyo();
    body["wait"] = json!(false);
    let response = post_json_auth(app.clone(), "/api/v1/search", body, &token).await;
    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let search_id = body_json(response).await["data"]["search_id"]
        .as_str()
        .unwrap()
        .to_string();

    // Manual trigger while the primary is still running.
    let uri = format!("/api/v1/search/{search_id}/fallback");
    let json = body_json(post_auth(app.clone(), &uri, &token).await).await;
    assert_eq!(json["data"]["triggered"], true);

    // A repeated trigger is a no-op.
    let json = body_json(post_auth(app.clone(), &uri, &token).await).await;
    assert_eq!(json["data"]["triggered"], false);

    let json = common::eventually(
        app,
        &format!("/api/v1/search/{search_id}"),
        &token,
        |j| j["data"]["phase"] == "done",
    )
    .await;
    assert_eq!(json["data"]["results"].as_array().unwrap().len(), 1);
    assert_eq!(primary.calls(), 1);
    assert_eq!(fallback.calls(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn sessions_are_private(pool: PgPool) {
    let primary = Stub::new("hotpepper", Ok(vec![shop("A", "東京都")]));
    let fallback = Stub::new("gemini", Ok(vec![]));
    let app = common::build_test_app_with_providers(pool.clone(), primary, fallback);
    let (_, owner) = common::user_with_token(&pool, app.clone(), "owner").await;
    let (_, other) = common::user_with_token(&pool, app.clone(), "other").await;

    let json = body_json(post_json_auth(app.clone(), "/api/v1/search", tokyo(), &owner).await).await;
    let search_id = json["data"]["search_id"].as_str().unwrap().to_string();

    let uri = format!("/api/v1/search/{search_id}");
    assert_eq!(get_auth(app.clone(), &uri, &owner).await.status(), StatusCode::OK);
    assert_eq!(get_auth(app, &uri, &other).await.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn prefecture_is_required(pool: PgPool) {
    let primary = Stub::new("hotpepper", Ok(vec![]));
    let fallback = Stub::new("gemini", Ok(vec![]));
    let app = common::build_test_app_with_providers(pool.clone(), primary.clone(), fallback);
    let (_, token) = common::user_with_token(&pool, app.clone(), "searcher").await;

    let response =
        post_json_auth(app, "/api/v1/search", json!({ "prefecture": " " }), &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(primary.calls(), 0);
}
