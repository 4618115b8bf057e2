use axum::extract::{Query, State};
use axum::Json;
use mineruca_core::paging::{clamp_limit, clamp_offset, DEFAULT_LIMIT, MAX_LIMIT};
use mineruca_db::models::restaurant::TimelineEntry;
use mineruca_db::repositories::RestaurantRepo;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/timeline
///
/// Recent favorites of users the caller follows, newest first.
pub async fn timeline(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<TimelineEntry>>>> {
    let limit = clamp_limit(params.limit, DEFAULT_LIMIT, MAX_LIMIT);
    let offset = clamp_offset(params.offset);

    let rows = RestaurantRepo::timeline(&state.pool, auth.user_id, limit, offset).await?;
    Ok(Json(DataResponse {
        data: rows.into_iter().map(TimelineEntry::from).collect(),
    }))
}
