//! Handlers for incoming follow requests.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use mineruca_core::error::CoreError;
use mineruca_core::types::DbId;
use mineruca_db::models::follow::{Follow, FollowRequest};
use mineruca_db::repositories::FollowRepo;
use mineruca_events::{event_types, DomainEvent};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/follows/requests
pub async fn list_requests(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<DataResponse<Vec<FollowRequest>>>> {
    let requests = FollowRepo::incoming_requests(&state.pool, auth.user_id).await?;
    Ok(Json(DataResponse { data: requests }))
}

/// POST /api/v1/follows/requests/{id}/accept
pub async fn accept(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Follow>>> {
    let follow = FollowRepo::accept(&state.pool, id, auth.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "FollowRequest",
            id,
        }))?;

    // The follower is the one who hears about it.
    state.event_bus.publish(
        DomainEvent::new(event_types::FOLLOW_ACCEPTED)
            .with_actor(auth.user_id)
            .with_target(follow.follower_id)
            .with_entity("follow", follow.id),
    );

    Ok(Json(DataResponse { data: follow }))
}

/// POST /api/v1/follows/requests/{id}/reject
///
/// Deletes the request. The requester is not notified.
pub async fn reject(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !FollowRepo::reject(&state.pool, id, auth.user_id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "FollowRequest",
            id,
        }));
    }
    Ok(StatusCode::NO_CONTENT)
}
