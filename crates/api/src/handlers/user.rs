//! Handlers for other users: lookup, follow/unfollow, and viewing their lists.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use mineruca_core::error::CoreError;
use mineruca_core::follow::{can_view_list, validate_follow};
use mineruca_core::pipeline::derive_visible;
use mineruca_core::restaurant::Restaurant;
use mineruca_core::types::DbId;
use mineruca_db::models::follow::Follow;
use mineruca_db::models::user::UserSummary;
use mineruca_db::repositories::{FollowRepo, UserRepo};
use mineruca_db::DbPool;
use mineruca_events::{event_types, DomainEvent};
use serde::Deserialize;

use crate::error::{is_unique_violation, AppError, AppResult};
use crate::handlers::restaurant::load_restaurants;
use crate::middleware::auth::AuthUser;
use crate::query::ListParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Default and maximum number of matches for `/users/search`.
const SEARCH_LIMIT: i64 = 20;

#[derive(Debug, Deserialize)]
pub struct UserSearchParams {
    pub q: String,
    pub limit: Option<i64>,
}

/// GET /api/v1/users/search?q=
///
/// Prefix match on username, excluding the caller and inactive accounts.
pub async fn search(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<UserSearchParams>,
) -> AppResult<Json<DataResponse<Vec<UserSummary>>>> {
    let q = params.q.trim();
    if q.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Search query must not be empty".into(),
        )));
    }
    let limit = params.limit.unwrap_or(SEARCH_LIMIT).clamp(1, SEARCH_LIMIT);

    let users = UserRepo::search_by_username(&state.pool, q, auth.user_id, limit).await?;
    Ok(Json(DataResponse { data: users }))
}

/// POST /api/v1/users/{id}/follow
///
/// Send a follow request. It stays pending until the target accepts.
pub async fn follow(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<DbId>,
) -> AppResult<(StatusCode, Json<DataResponse<Follow>>)> {
    validate_follow(auth.user_id, user_id)?;
    ensure_user_exists(&state.pool, user_id).await?;

    let follow = FollowRepo::request(&state.pool, auth.user_id, user_id)
        .await
        .map_err(|e| {
            if is_unique_violation(&e, "uq_follows_pair") {
                AppError::Core(CoreError::Conflict(
                    "Already following or request pending".into(),
                ))
            } else {
                AppError::Database(e)
            }
        })?;

    state.event_bus.publish(
        DomainEvent::new(event_types::FOLLOW_REQUESTED)
            .with_actor(auth.user_id)
            .with_target(user_id)
            .with_entity("follow", follow.id),
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: follow })))
}

/// DELETE /api/v1/users/{id}/follow
///
/// Unfollow, or withdraw a pending request.
pub async fn unfollow(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !FollowRepo::unfollow(&state.pool, auth.user_id, user_id).await? {
        return Err(AppError::NotFound("Not following this user".into()));
    }

    state.event_bus.publish(
        DomainEvent::new(event_types::FOLLOW_REMOVED)
            .with_actor(auth.user_id)
            .with_target(user_id),
    );

    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/users/{id}/followers
pub async fn followers(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(user_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<UserSummary>>>> {
    ensure_user_exists(&state.pool, user_id).await?;
    let users = FollowRepo::followers(&state.pool, user_id).await?;
    Ok(Json(DataResponse { data: users }))
}

/// GET /api/v1/users/{id}/following
pub async fn following(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(user_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<UserSummary>>>> {
    ensure_user_exists(&state.pool, user_id).await?;
    let users = FollowRepo::following(&state.pool, user_id).await?;
    Ok(Json(DataResponse { data: users }))
}

/// GET /api/v1/users/{id}/restaurants
///
/// Visible to the owner and to accepted followers.
pub async fn restaurants(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<DbId>,
    Query(params): Query<ListParams>,
) -> AppResult<Json<DataResponse<Vec<Restaurant>>>> {
    let sort = params.sort()?;
    let mode = params.view_mode()?;
    ensure_user_exists(&state.pool, user_id).await?;

    let status = FollowRepo::find_pair(&state.pool, auth.user_id, user_id)
        .await?
        .and_then(|f| f.status());
    if !can_view_list(auth.user_id, user_id, status) {
        return Err(AppError::Core(CoreError::Forbidden(
            "Follow this user to see their list".into(),
        )));
    }

    let restaurants = load_restaurants(&state.pool, user_id).await?;
    let visible = derive_visible(&restaurants, &params.filters(), &sort, mode);
    Ok(Json(DataResponse { data: visible }))
}

async fn ensure_user_exists(pool: &DbPool, id: DbId) -> AppResult<()> {
    match UserRepo::find_by_id(pool, id).await? {
        Some(user) if user.is_active => Ok(()),
        _ => Err(AppError::Core(CoreError::NotFound { entity: "User", id })),
    }
}
