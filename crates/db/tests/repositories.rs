//! Integration tests for the repository layer.
//!
//! Exercises the repositories against a real database:
//! - Restaurant create / partial update / owner scoping / hard delete
//! - Follow request lifecycle and the timeline join
//! - Share token lookup
//! - Notification read state
//! - Search logs feeding the usage report
//! - Purging dead refresh sessions

use chrono::{Duration, Utc};
use mineruca_core::restaurant::{Coordinates, NewRestaurant, PriceRange, RestaurantPatch};
use mineruca_db::models::notification::CreateNotification;
use mineruca_db::models::search_log::CreateSearchLog;
use mineruca_db::models::session::CreateSession;
use mineruca_db::models::share::CreateShare;
use mineruca_db::models::user::{CreateUser, User};
use mineruca_db::repositories::{
    FollowRepo, NotificationRepo, RestaurantRepo, SearchLogRepo, SessionRepo, ShareRepo,
    UserRepo,
};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn user(pool: &PgPool, name: &str) -> User {
    UserRepo::create(
        pool,
        &CreateUser {
            username: name.to_string(),
            email: format!("{name}@example.com"),
            password_hash: "not-a-real-hash".to_string(),
            role: "user".to_string(),
        },
    )
    .await
    .unwrap()
}

fn new_restaurant(name: &str) -> NewRestaurant {
    NewRestaurant {
        name: name.to_string(),
        address: "東京都港区六本木1-1".to_string(),
        hours: "11:00-22:00".to_string(),
        price_range: Some(PriceRange {
            min: Some(1000),
            max: Some(2000),
        }),
        is_closed: false,
        coordinates: Some(Coordinates {
            latitude: 0.0,
            longitude: 0.0,
        }),
        prefecture: "東京都".to_string(),
        city: "港区".to_string(),
        website: None,
        sources: Vec::new(),
        visit_count: 0,
        comment: String::new(),
        custom_url: Some("  ".to_string()),
        genres: vec!["寿司".into(), " 寿司 ".into(), "".into(), "和食".into()],
    }
}

// ---------------------------------------------------------------------------
// Restaurants
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_normalises_sentinels_and_genres(pool: PgPool) {
    let owner = user(&pool, "alice").await;
    let row = RestaurantRepo::create(&pool, owner.id, &new_restaurant("鮨 一"))
        .await
        .unwrap();

    assert!(row.latitude.is_none(), "(0, 0) must not be stored");
    assert!(row.custom_url.is_none());
    assert_eq!(row.genres, vec!["寿司", "和食"]);

    let domain = row.into_domain();
    assert!(domain.coordinates.is_none());
    assert_eq!(domain.price_range.unwrap().max, Some(2000));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_partial_update_only_touches_given_fields(pool: PgPool) {
    let owner = user(&pool, "alice").await;
    let row = RestaurantRepo::create(&pool, owner.id, &new_restaurant("鮨 一"))
        .await
        .unwrap();

    let patch = RestaurantPatch {
        visit_count: Some(3),
        coordinates: Some(Coordinates {
            latitude: 35.66,
            longitude: 139.73,
        }),
        ..Default::default()
    };
    let updated = RestaurantRepo::update(&pool, row.id, owner.id, &patch)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(updated.visit_count, 3);
    assert_eq!(updated.latitude, Some(35.66));
    assert_eq!(updated.hours, "11:00-22:00");
    assert_eq!(updated.price_min, Some(1000));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_custom_url_empty_string_clears(pool: PgPool) {
    let owner = user(&pool, "alice").await;
    let row = RestaurantRepo::create(&pool, owner.id, &new_restaurant("鮨 一"))
        .await
        .unwrap();

    let set = RestaurantPatch {
        custom_url: Some("https://example.com/menu".into()),
        ..Default::default()
    };
    let updated = RestaurantRepo::update(&pool, row.id, owner.id, &set)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.custom_url.as_deref(), Some("https://example.com/menu"));

    let clear = RestaurantPatch {
        custom_url: Some(String::new()),
        ..Default::default()
    };
    let cleared = RestaurantRepo::update(&pool, row.id, owner.id, &clear)
        .await
        .unwrap()
        .unwrap();
    assert!(cleared.custom_url.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_negative_visit_count_rejected_by_constraint(pool: PgPool) {
    let owner = user(&pool, "alice").await;
    let row = RestaurantRepo::create(&pool, owner.id, &new_restaurant("鮨 一"))
        .await
        .unwrap();
    let patch = RestaurantPatch {
        visit_count: Some(-1),
        ..Default::default()
    };
    let result = RestaurantRepo::update(&pool, row.id, owner.id, &patch).await;
    assert!(result.is_err(), "CHECK constraint must reject negative counts");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_only_owner_can_mutate(pool: PgPool) {
    let owner = user(&pool, "alice").await;
    let other = user(&pool, "bob").await;
    let row = RestaurantRepo::create(&pool, owner.id, &new_restaurant("鮨 一"))
        .await
        .unwrap();

    let patch = RestaurantPatch {
        is_closed: Some(true),
        ..Default::default()
    };
    assert!(RestaurantRepo::update(&pool, row.id, other.id, &patch)
        .await
        .unwrap()
        .is_none());
    assert!(!RestaurantRepo::delete(&pool, row.id, other.id).await.unwrap());
    assert!(RestaurantRepo::delete(&pool, row.id, owner.id).await.unwrap());
    assert!(RestaurantRepo::find_by_id(&pool, row.id).await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_for_user_newest_first(pool: PgPool) {
    let owner = user(&pool, "alice").await;
    let first = RestaurantRepo::create(&pool, owner.id, &new_restaurant("A"))
        .await
        .unwrap();
    let second = RestaurantRepo::create(&pool, owner.id, &new_restaurant("B"))
        .await
        .unwrap();

    let rows = RestaurantRepo::list_for_user(&pool, owner.id).await.unwrap();
    let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![second.id, first.id]);
}

// ---------------------------------------------------------------------------
// Follows and timeline
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_follow_request_lifecycle(pool: PgPool) {
    let alice = user(&pool, "alice").await;
    let bob = user(&pool, "bob").await;

    let request = FollowRepo::request(&pool, alice.id, bob.id).await.unwrap();
    assert_eq!(request.status, "pending");
    assert!(FollowRepo::request(&pool, alice.id, bob.id).await.is_err());

    let incoming = FollowRepo::incoming_requests(&pool, bob.id).await.unwrap();
    assert_eq!(incoming.len(), 1);
    assert_eq!(incoming[0].follower_username, "alice");

    // Only the followee can accept.
    assert!(FollowRepo::accept(&pool, request.id, alice.id).await.unwrap().is_none());
    let accepted = FollowRepo::accept(&pool, request.id, bob.id)
        .await
        .unwrap()
        .unwrap();
    assert!(accepted.is_accepted());
    assert!(accepted.accepted_at.is_some());

    let followers = FollowRepo::followers(&pool, bob.id).await.unwrap();
    assert_eq!(followers.len(), 1);
    assert_eq!(followers[0].username, "alice");
    assert_eq!(FollowRepo::follower_ids(&pool, bob.id).await.unwrap(), vec![alice.id]);

    assert!(FollowRepo::unfollow(&pool, alice.id, bob.id).await.unwrap());
    assert!(FollowRepo::following(&pool, alice.id).await.unwrap().is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_self_follow_rejected_by_constraint(pool: PgPool) {
    let alice = user(&pool, "alice").await;
    assert!(FollowRepo::request(&pool, alice.id, alice.id).await.is_err());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_reject_deletes_pending_request(pool: PgPool) {
    let alice = user(&pool, "alice").await;
    let bob = user(&pool, "bob").await;
    let request = FollowRepo::request(&pool, alice.id, bob.id).await.unwrap();

    assert!(FollowRepo::reject(&pool, request.id, bob.id).await.unwrap());
    assert!(FollowRepo::find_pair(&pool, alice.id, bob.id).await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_timeline_only_shows_accepted_follows(pool: PgPool) {
    let alice = user(&pool, "alice").await;
    let bob = user(&pool, "bob").await;
    let carol = user(&pool, "carol").await;

    RestaurantRepo::create(&pool, bob.id, &new_restaurant("Bob's"))
        .await
        .unwrap();
    RestaurantRepo::create(&pool, carol.id, &new_restaurant("Carol's"))
        .await
        .unwrap();

    let to_bob = FollowRepo::request(&pool, alice.id, bob.id).await.unwrap();
    FollowRepo::accept(&pool, to_bob.id, bob.id).await.unwrap();
    FollowRepo::request(&pool, alice.id, carol.id).await.unwrap();

    let timeline = RestaurantRepo::timeline(&pool, alice.id, 50, 0).await.unwrap();
    assert_eq!(timeline.len(), 1);
    assert_eq!(timeline[0].username, "bob");
    assert_eq!(timeline[0].restaurant.name, "Bob's");
}

// ---------------------------------------------------------------------------
// Shares
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_share_lookup_and_snapshot(pool: PgPool) {
    let alice = user(&pool, "alice").await;
    let share = ShareRepo::create(
        &pool,
        &CreateShare {
            token: "9a1f3a8e-3f0b-4c55-9d6e-6d2f0f5b7c11".to_string(),
            user_id: alice.id,
            filters: Some(serde_json::json!({
                "sidebar_filters": [{"type": "prefecture", "value": "東京都"}],
                "genre_filters": ["寿司"]
            })),
            expires_at: Utc::now() + Duration::days(7),
        },
    )
    .await
    .unwrap();

    let found = ShareRepo::find_by_token(&pool, &share.token)
        .await
        .unwrap()
        .unwrap();
    let snapshot = found.snapshot();
    assert_eq!(snapshot.sidebar_filters.len(), 1);
    assert_eq!(snapshot.genre_filters, vec!["寿司"]);

    let bob = user(&pool, "bob").await;
    assert!(!ShareRepo::delete(&pool, share.id, bob.id).await.unwrap());
    assert!(ShareRepo::delete(&pool, share.id, alice.id).await.unwrap());
}

// ---------------------------------------------------------------------------
// Notifications
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_notification_read_state(pool: PgPool) {
    let alice = user(&pool, "alice").await;
    let bob = user(&pool, "bob").await;

    let input = |kind: &str| CreateNotification {
        user_id: bob.id,
        actor_id: Some(alice.id),
        kind: kind.to_string(),
        entity_id: None,
        payload: serde_json::json!({}),
    };
    let first = NotificationRepo::create(&pool, &input("follow_request"))
        .await
        .unwrap();
    NotificationRepo::create(&pool, &input("follow_accepted"))
        .await
        .unwrap();

    assert_eq!(NotificationRepo::unread_count(&pool, bob.id).await.unwrap(), 2);
    assert!(NotificationRepo::mark_read(&pool, first, bob.id).await.unwrap());
    assert!(!NotificationRepo::mark_read(&pool, first, bob.id).await.unwrap());

    let unread = NotificationRepo::list_for_user(&pool, bob.id, true, 50, 0)
        .await
        .unwrap();
    assert_eq!(unread.len(), 1);
    assert_eq!(unread[0].actor_username.as_deref(), Some("alice"));

    assert_eq!(NotificationRepo::mark_all_read(&pool, bob.id).await.unwrap(), 1);
    assert_eq!(NotificationRepo::unread_count(&pool, bob.id).await.unwrap(), 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_unknown_notification_kind_rejected(pool: PgPool) {
    let alice = user(&pool, "alice").await;
    let result = NotificationRepo::create(
        &pool,
        &CreateNotification {
            user_id: alice.id,
            actor_id: None,
            kind: "like".to_string(),
            entity_id: None,
            payload: serde_json::json!({}),
        },
    )
    .await;
    assert!(result.is_err());
}

// ---------------------------------------------------------------------------
// Usage report
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_usage_report_counts_searches_and_favorites(pool: PgPool) {
    let alice = user(&pool, "alice").await;
    let bob = user(&pool, "bob").await;

    for fallback_used in [false, true, true] {
        SearchLogRepo::create(
            &pool,
            &CreateSearchLog {
                user_id: alice.id,
                prefecture: "東京都".to_string(),
                keyword: Some("寿司".to_string()),
                primary_count: 0,
                fallback_used,
                result_count: 2,
            },
        )
        .await
        .unwrap();
    }
    RestaurantRepo::create(&pool, bob.id, &new_restaurant("B"))
        .await
        .unwrap();

    let report = SearchLogRepo::usage_report(&pool, Utc::now() - Duration::days(30))
        .await
        .unwrap();
    assert_eq!(report.len(), 2);
    assert_eq!(report[0].username, "alice");
    assert_eq!(report[0].search_count, 3);
    assert_eq!(report[0].fallback_count, 2);
    assert_eq!(report[1].restaurant_count, 1);
    assert!(report[1].last_search_at.is_none());
}

// ---------------------------------------------------------------------------
// Sessions
// ---------------------------------------------------------------------------

async fn session(pool: &PgPool, user_id: i64, hash: &str, expires_in: Duration) -> i64 {
    SessionRepo::create(
        pool,
        &CreateSession {
            user_id,
            refresh_token_hash: hash.to_string(),
            expires_at: Utc::now() + expires_in,
        },
    )
    .await
    .unwrap()
    .id
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_purge_removes_expired_and_old_revoked_sessions(pool: PgPool) {
    let owner = user(&pool, "alice").await;
    session(&pool, owner.id, "live", Duration::days(7)).await;
    session(&pool, owner.id, "expired", Duration::minutes(-1)).await;
    let revoked = session(&pool, owner.id, "revoked", Duration::days(7)).await;
    assert!(SessionRepo::revoke(&pool, revoked).await.unwrap());

    // Revoked just now: kept while the cutoff is in the past.
    let removed = SessionRepo::purge_dead(&pool, Utc::now() - Duration::hours(1))
        .await
        .unwrap();
    assert_eq!(removed, 1);

    let removed = SessionRepo::purge_dead(&pool, Utc::now() + Duration::seconds(1))
        .await
        .unwrap();
    assert_eq!(removed, 1);

    let left: Vec<String> =
        sqlx::query_scalar("SELECT refresh_token_hash FROM user_sessions ORDER BY id")
            .fetch_all(&pool)
            .await
            .unwrap();
    assert_eq!(left, vec!["live"]);
    assert!(SessionRepo::find_live_by_hash(&pool, "live").await.unwrap().is_some());
}
