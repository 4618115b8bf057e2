//! Admin user management and usage reporting.

mod common;

use axum::http::StatusCode;
use common::{body_json, get_auth, patch_json_auth, post_json, post_json_auth};
use mineruca_db::models::search_log::CreateSearchLog;
use mineruca_db::repositories::SearchLogRepo;
use serde_json::json;
use sqlx::PgPool;

async fn admin_token(pool: &PgPool, app: axum::Router) -> (i64, String) {
    let admin = common::create_test_user(pool, "admin", "admin").await;
    let token = common::login(app, "admin").await;
    (admin.id, token)
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn non_admin_is_forbidden(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (_, token) = common::user_with_token(&pool, app.clone(), "regular").await;

    let response = get_auth(app, "/api/v1/admin/users", &token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn list_users_reports_total(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (_, token) = admin_token(&pool, app.clone()).await;
    common::create_test_user(&pool, "alice", "user").await;
    common::create_test_user(&pool, "bob", "user").await;

    let response = get_auth(app, "/api/v1/admin/users?limit=2", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;

    assert_eq!(json["data"]["total"], 3);
    assert_eq!(json["data"]["users"].as_array().unwrap().len(), 2);
    assert!(json["data"]["users"][0].get("password_hash").is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn bulk_create_reports_each_entry(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (_, token) = admin_token(&pool, app.clone()).await;
    common::create_test_user(&pool, "taken", "user").await;

    let body = json!({
        "users": [
            { "username": "fresh", "email": "fresh@test.com", "password": "long_enough_1" },
            { "username": "taken", "email": "other@test.com", "password": "long_enough_1" },
            { "username": "shortpw", "email": "shortpw@test.com", "password": "short" },
            { "username": "boss", "email": "boss@test.com", "password": "long_enough_1", "role": "admin" }
        ]
    });
    let response = post_json_auth(app.clone(), "/api/v1/admin/users/bulk", body, &token).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;

    let created = json["data"]["created"].as_array().unwrap();
    assert_eq!(created.len(), 2);
    assert_eq!(created[1]["role"], "admin");

    let failed = json["data"]["failed"].as_array().unwrap();
    assert_eq!(failed.len(), 2);
    assert_eq!(failed[0]["index"], 1);
    assert_eq!(failed[0]["error"], "Username is already taken");
    assert_eq!(failed[1]["username"], "shortpw");

    // Created accounts can sign in.
    let response = post_json(
        app,
        "/api/v1/auth/login",
        json!({ "username": "fresh", "password": "long_enough_1" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn bulk_create_rejects_empty_list(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (_, token) = admin_token(&pool, app.clone()).await;

    let response =
        post_json_auth(app, "/api/v1/admin/users/bulk", json!({ "users": [] }), &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn deactivation_revokes_access(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (_, admin) = admin_token(&pool, app.clone()).await;
    let (user, _) = common::user_with_token(&pool, app.clone(), "leaving").await;

    let uri = format!("/api/v1/admin/users/{}", user.id);
    let response =
        patch_json_auth(app.clone(), &uri, json!({ "is_active": false }), &admin).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["is_active"], false);

    // Refresh sessions are revoked and login is refused.
    let live: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM user_sessions WHERE user_id = $1 AND NOT is_revoked",
    )
    .bind(user.id)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(live, 0);
    let response = post_json(
        app,
        "/api/v1/auth/login",
        json!({ "username": "leaving", "password": common::TEST_PASSWORD }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn role_changes_are_validated(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (admin_id, admin) = admin_token(&pool, app.clone()).await;
    let user = common::create_test_user(&pool, "promoted", "user").await;
    let uri = format!("/api/v1/admin/users/{}", user.id);

    let response = patch_json_auth(app.clone(), &uri, json!({ "role": "owner" }), &admin).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = patch_json_auth(app.clone(), &uri, json!({}), &admin).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = patch_json_auth(app.clone(), &uri, json!({ "role": "admin" }), &admin).await;
    assert_eq!(body_json(response).await["data"]["role"], "admin");

    let own = format!("/api/v1/admin/users/{admin_id}");
    let response = patch_json_auth(app.clone(), &own, json!({ "role": "user" }), &admin).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = patch_json_auth(app, "/api/v1/admin/users/999999", json!({ "role": "user" }), &admin).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn usage_counts_recent_searches(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (_, admin) = admin_token(&pool, app.clone()).await;
    let user = common::create_test_user(&pool, "hungry", "user").await;

    for fallback_used in [false, true, true] {
        let log = CreateSearchLog {
            user_id: user.id,
            prefecture: "東京都".to_string(),
            keyword: None,
            primary_count: 0,
            fallback_used,
            result_count: 1,
        };
        SearchLogRepo::create(&pool, &log).await.unwrap();
    }

    let response = get_auth(app.clone(), "/api/v1/admin/usage?days=7", &admin).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["days"], 7);

    let row = json["data"]["users"]
        .as_array()
        .unwrap()
        .iter()
        .find(|u| u["username"] == "hungry")
        .cloned()
        .unwrap();
    assert_eq!(row["search_count"], 3);
    assert_eq!(row["fallback_count"], 2);

    let response = get_auth(app, "/api/v1/admin/usage?days=0", &admin).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
