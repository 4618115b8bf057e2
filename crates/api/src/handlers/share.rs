//! Handlers for share links.
//!
//! Owners manage their links under `/shares`; anyone holding a token reads
//! through `/shared/{token}` without authentication.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use mineruca_core::error::CoreError;
use mineruca_core::pipeline::derive_visible;
use mineruca_core::restaurant::Restaurant;
use mineruca_core::share::{
    ensure_active, expiry_from, generate_token, is_well_formed_token, resolve_expiry_days,
    NewShare, SharedView,
};
use mineruca_core::types::DbId;
use mineruca_db::models::share::{CreateShare, Share};
use mineruca_db::repositories::{ShareRepo, UserRepo};
use mineruca_events::{event_types, DomainEvent};

use crate::error::{AppError, AppResult};
use crate::handlers::restaurant::load_restaurants;
use crate::middleware::auth::AuthUser;
use crate::query::ListParams;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Owner handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/shares
///
/// Create a link to the caller's list. Filters, when given, are frozen into
/// the link; the restaurants behind it stay live.
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<NewShare>,
) -> AppResult<(StatusCode, Json<DataResponse<Share>>)> {
    let days = resolve_expiry_days(
        input.expires_in_days,
        state.config.share_default_expiry_days,
        state.config.share_max_expiry_days,
    )?;

    let filters = input
        .filters
        .filter(|f| !f.is_empty())
        .map(|f| serde_json::to_value(&f))
        .transpose()
        .map_err(|e| AppError::InternalError(format!("Filter serialization error: {e}")))?;

    let create = CreateShare {
        token: generate_token(),
        user_id: auth.user_id,
        filters,
        expires_at: expiry_from(Utc::now(), days),
    };
    let share = ShareRepo::create(&state.pool, &create).await?;

    tracing::info!(share_id = share.id, user_id = auth.user_id, days, "Share created");
    state.event_bus.publish(
        DomainEvent::new(event_types::SHARE_CREATED)
            .with_actor(auth.user_id)
            .with_entity("share", share.id),
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: share })))
}

/// GET /api/v1/shares
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<DataResponse<Vec<Share>>>> {
    let shares = ShareRepo::list_for_user(&state.pool, auth.user_id).await?;
    Ok(Json(DataResponse { data: shares }))
}

/// DELETE /api/v1/shares/{id}
pub async fn revoke(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !ShareRepo::delete(&state.pool, id, auth.user_id).await? {
        return Err(AppError::Core(CoreError::NotFound { entity: "Share", id }));
    }

    state.event_bus.publish(
        DomainEvent::new(event_types::SHARE_REVOKED)
            .with_actor(auth.user_id)
            .with_entity("share", id),
    );

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Public handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/shared/{token}
pub async fn resolve(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> AppResult<Json<DataResponse<SharedView>>> {
    let share = find_active(&state, &token).await?;
    let owner = UserRepo::find_by_id(&state.pool, share.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Share link not found".into()))?;

    Ok(Json(DataResponse {
        data: SharedView {
            owner_username: owner.username,
            expires_at: share.expires_at,
            filters: share.snapshot(),
        },
    }))
}

/// GET /api/v1/shared/{token}/restaurants
///
/// Filters come from the link's snapshot; only `sort` and `view` are read
/// from the query string.
pub async fn restaurants(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Query(params): Query<ListParams>,
) -> AppResult<Json<DataResponse<Vec<Restaurant>>>> {
    let sort = params.sort()?;
    let mode = params.view_mode()?;
    let share = find_active(&state, &token).await?;

    let restaurants = load_restaurants(&state.pool, share.user_id).await?;
    let visible = derive_visible(&restaurants, &share.snapshot(), &sort, mode);
    Ok(Json(DataResponse { data: visible }))
}

/// Look up a share by token: malformed or unknown is 404, expired is 410.
async fn find_active(state: &AppState, token: &str) -> AppResult<Share> {
    if !is_well_formed_token(token) {
        return Err(AppError::NotFound("Share link not found".into()));
    }
    let share = ShareRepo::find_by_token(&state.pool, token)
        .await?
        .ok_or_else(|| AppError::NotFound("Share link not found".into()))?;
    ensure_active(share.expires_at, Utc::now())?;
    Ok(share)
}
