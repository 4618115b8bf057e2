//! Favorites CRUD and the derived list pipeline over HTTP.

mod common;

use axum::http::StatusCode;
use common::{body_json, delete_auth, get_auth, patch_json_auth, post_auth, post_json_auth};
use serde_json::json;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn create(app: axum::Router, token: &str, body: serde_json::Value) -> serde_json::Value {
    let response = post_json_auth(app, "/api/v1/restaurants", body, token).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"].clone()
}

fn restaurant(name: &str, prefecture: &str, city: &str) -> serde_json::Value {
    json!({
        "name": name,
        "address": format!("{prefecture}{city}1-1"),
        "prefecture": prefecture,
        "city": city,
    })
}

fn names(json: &serde_json::Value) -> Vec<String> {
    json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["name"].as_str().unwrap().to_string())
        .collect()
}

// ---------------------------------------------------------------------------
// CRUD
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_fills_location_from_address(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (user, token) = common::user_with_token(&pool, app.clone(), "owner").await;

    let body = json!({
        "name": "中華そば 青葉",
        "address": "東京都中野区中野5-58-1",
        "prefecture": "",
        "city": "",
        "genres": ["ラーメン", "ラーメン", " つけ麺 "],
        "price_range": { "min": 800, "max": 1200 },
    });
    let created = create(app, &token, body).await;

    assert_eq!(created["user_id"], user.id);
    assert_eq!(created["prefecture"], "東京都");
    assert_eq!(created["city"], "中野区");
    assert_eq!(created["genres"], json!(["ラーメン", "つけ麺"]));
    assert_eq!(created["price_range"]["min"], 800);
    assert_eq!(created["visit_count"], 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_rejects_missing_location(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (_, token) = common::user_with_token(&pool, app.clone(), "owner").await;

    let body = json!({ "name": "Somewhere", "address": "abroad", "prefecture": "", "city": "" });
    let response = post_json_auth(app, "/api/v1/restaurants", body, &token).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn patch_updates_editable_fields(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (_, token) = common::user_with_token(&pool, app.clone(), "owner").await;
    let created = create(app.clone(), &token, restaurant("鮨 さいとう", "東京都", "港区")).await;
    let id = created["id"].as_i64().unwrap();

    let patch = json!({
        "visit_count": 3,
        "comment": "カウンターがおすすめ",
        "is_closed": true,
        "coordinates": { "latitude": 35.66, "longitude": 139.74 },
    });
    let response =
        patch_json_auth(app.clone(), &format!("/api/v1/restaurants/{id}"), patch, &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["visit_count"], 3);
    assert_eq!(json["data"]["is_closed"], true);
    assert_eq!(json["data"]["coordinates"]["latitude"], 35.66);

    // Empty patch and negative visit count are rejected.
    let response =
        patch_json_auth(app.clone(), &format!("/api/v1/restaurants/{id}"), json!({}), &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let response = patch_json_auth(
        app,
        &format!("/api/v1/restaurants/{id}"),
        json!({ "visit_count": -1 }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn other_users_rows_are_not_found(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (_, owner) = common::user_with_token(&pool, app.clone(), "owner").await;
    let (_, stranger) = common::user_with_token(&pool, app.clone(), "stranger").await;
    let created = create(app.clone(), &owner, restaurant("A", "東京都", "港区")).await;
    let uri = format!("/api/v1/restaurants/{}", created["id"]);

    let response = get_auth(app.clone(), &uri, &stranger).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let response = patch_json_auth(app.clone(), &uri, json!({ "visit_count": 9 }), &stranger).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let response = delete_auth(app.clone(), &uri, &stranger).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Still there for the owner.
    let response = get_auth(app, &uri, &owner).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn delete_removes_row(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (_, token) = common::user_with_token(&pool, app.clone(), "owner").await;
    let created = create(app.clone(), &token, restaurant("A", "東京都", "港区")).await;
    let uri = format!("/api/v1/restaurants/{}", created["id"]);

    let response = delete_auth(app.clone(), &uri, &token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let response = get_auth(app, &uri, &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn geocode_without_api_key_is_503(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (_, token) = common::user_with_token(&pool, app.clone(), "owner").await;
    let created = create(app.clone(), &token, restaurant("A", "東京都", "港区")).await;

    let uri = format!("/api/v1/restaurants/{}/geocode", created["id"]);
    let response = post_auth(app, &uri, &token).await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

// ---------------------------------------------------------------------------
// Derived list
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn list_applies_filters_sort_and_view(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (_, token) = common::user_with_token(&pool, app.clone(), "owner").await;

    let a = create(app.clone(), &token, restaurant("A", "東京都", "港区")).await;
    create(app.clone(), &token, restaurant("B", "大阪府", "大阪市")).await;
    let c = create(app.clone(), &token, restaurant("C", "北海道", "札幌市")).await;
    let closed = json!({ "is_closed": true });
    patch_json_auth(
        app.clone(),
        &format!("/api/v1/restaurants/{}", c["id"]),
        closed,
        &token,
    )
    .await;
    patch_json_auth(
        app.clone(),
        &format!("/api/v1/restaurants/{}", a["id"]),
        json!({ "genres": ["寿司"] }),
        &token,
    )
    .await;

    // Source order is newest first.
    let json = body_json(get_auth(app.clone(), "/api/v1/restaurants", &token).await).await;
    assert_eq!(names(&json), vec!["C", "B", "A"]);

    // Canonical prefecture order: 北海道 < 東京都 < 大阪府.
    let json = body_json(
        get_auth(app.clone(), "/api/v1/restaurants?sort=prefecture:asc", &token).await,
    )
    .await;
    assert_eq!(names(&json), vec!["C", "A", "B"]);

    // Map view hides closed restaurants.
    let json = body_json(get_auth(app.clone(), "/api/v1/restaurants?view=map", &token).await).await;
    assert_eq!(names(&json), vec!["B", "A"]);

    // Sidebar entries are a union.
    let uri = "/api/v1/restaurants?prefectures=%E6%9D%B1%E4%BA%AC%E9%83%BD&cities=%E5%A4%A7%E9%98%AA%E5%B8%82";
    let json = body_json(get_auth(app.clone(), uri, &token).await).await;
    assert_eq!(names(&json), vec!["B", "A"]);

    // Genre filter.
    let uri = "/api/v1/restaurants?genres=%E5%AF%BF%E5%8F%B8";
    let json = body_json(get_auth(app.clone(), uri, &token).await).await;
    assert_eq!(names(&json), vec!["A"]);

    // Bad parameters are 400.
    let response = get_auth(app.clone(), "/api/v1/restaurants?view=globe", &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let response = get_auth(app, "/api/v1/restaurants?sort=colour:asc", &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn sidebar_and_genres(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (_, token) = common::user_with_token(&pool, app.clone(), "owner").await;

    let mut body = restaurant("A", "東京都", "港区");
    body["genres"] = json!(["寿司", "和食"]);
    create(app.clone(), &token, body).await;
    let mut body = restaurant("B", "東京都", "渋谷区");
    body["genres"] = json!(["和食"]);
    create(app.clone(), &token, body).await;
    create(app.clone(), &token, restaurant("C", "北海道", "札幌市")).await;

    let json = body_json(get_auth(app.clone(), "/api/v1/restaurants/sidebar", &token).await).await;
    let tree = json["data"].as_array().unwrap();
    assert_eq!(tree.len(), 2);
    assert_eq!(tree[0]["prefecture"], "北海道");
    assert_eq!(tree[1]["prefecture"], "東京都");
    assert_eq!(tree[1]["count"], 2);
    assert_eq!(tree[1]["cities"].as_array().unwrap().len(), 2);

    let json = body_json(get_auth(app, "/api/v1/restaurants/genres", &token).await).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 2);
}
