//! Handlers for restaurant search sessions.
//!
//! A search runs the primary provider and, when that comes back empty or
//! fails, the fallback. The session stays addressable for a while so the
//! client can poll it or trigger the fallback by hand.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use mineruca_core::search::{SearchOutcome, SearchQuery, SearchSession};
use mineruca_core::types::DbId;
use mineruca_db::models::search_log::CreateSearchLog;
use mineruca_db::repositories::SearchLogRepo;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::search::SharedSession;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct StartSearchRequest {
    #[serde(flatten)]
    pub query: SearchQuery,
    /// When `false`, respond 202 immediately and let the client poll.
    #[serde(default = "default_wait")]
    pub wait: bool,
}

fn default_wait() -> bool {
    true
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub search_id: Uuid,
    #[serde(flatten)]
    pub outcome: SearchOutcome,
}

#[derive(Debug, Serialize)]
pub struct FallbackResponse {
    pub search_id: Uuid,
    /// `false` when the fallback had already been started.
    pub triggered: bool,
    #[serde(flatten)]
    pub outcome: SearchOutcome,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/search
pub async fn start(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<StartSearchRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<SearchResponse>>)> {
    input.query.validate()?;

    let (search_id, session) = state
        .search_sessions
        .insert(auth.user_id, SearchSession::new(input.query))
        .await;
    tracing::debug!(%search_id, user_id = auth.user_id, "Search session created");

    if input.wait {
        let outcome = run_and_log(state, auth.user_id, session).await;
        return Ok((
            StatusCode::OK,
            Json(DataResponse {
                data: SearchResponse { search_id, outcome },
            }),
        ));
    }

    let task_session = session.clone();
    tokio::spawn(run_and_log(state, auth.user_id, task_session));

    let outcome = session.lock().await.outcome();
    Ok((
        StatusCode::ACCEPTED,
        Json(DataResponse {
            data: SearchResponse { search_id, outcome },
        }),
    ))
}

/// GET /api/v1/search/{id}
pub async fn get_status(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(search_id): Path<Uuid>,
) -> AppResult<Json<DataResponse<SearchResponse>>> {
    let session = find_session(&state, search_id, auth.user_id).await?;
    let outcome = session.lock().await.outcome();
    Ok(Json(DataResponse {
        data: SearchResponse { search_id, outcome },
    }))
}

/// POST /api/v1/search/{id}/fallback
///
/// Manual fallback trigger. Safe to repeat: only the first trigger per
/// session calls the fallback provider.
pub async fn fallback(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(search_id): Path<Uuid>,
) -> AppResult<Json<DataResponse<FallbackResponse>>> {
    let session = find_session(&state, search_id, auth.user_id).await?;

    let triggered = state.search.run_manual_fallback(session.clone()).await;
    if triggered {
        tracing::info!(%search_id, user_id = auth.user_id, "Manual fallback search");
    }

    let outcome = session.lock().await.outcome();
    Ok(Json(DataResponse {
        data: FallbackResponse {
            search_id,
            triggered,
            outcome,
        },
    }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn find_session(state: &AppState, id: Uuid, user_id: DbId) -> AppResult<SharedSession> {
    state
        .search_sessions
        .get(id, user_id)
        .await
        .ok_or_else(|| AppError::NotFound("Search not found or expired".into()))
}

/// Drive the session and record it in `search_logs`. A failed log write is
/// only a warning.
async fn run_and_log(state: AppState, user_id: DbId, session: SharedSession) -> SearchOutcome {
    let outcome = state.search.run(session.clone()).await;

    let query = session.lock().await.query().clone();
    let log = CreateSearchLog {
        user_id,
        prefecture: query.prefecture,
        keyword: query.keyword.filter(|k| !k.trim().is_empty()),
        primary_count: i32::try_from(outcome.primary_count).unwrap_or(i32::MAX),
        fallback_used: outcome.fallback_used,
        result_count: i32::try_from(outcome.results.len()).unwrap_or(i32::MAX),
    };
    if let Err(e) = SearchLogRepo::create(&state.pool, &log).await {
        tracing::warn!(error = %e, user_id, "Failed to record search log");
    }

    outcome
}
