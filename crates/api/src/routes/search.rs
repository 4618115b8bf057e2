//! Route definitions for the `/search` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::search;
use crate::state::AppState;

/// Routes mounted at `/search`.
///
/// ```text
/// POST /                 -> start
/// GET  /{id}             -> get_status
/// POST /{id}/fallback    -> fallback
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(search::start))
        .route("/{id}", get(search::get_status))
        .route("/{id}/fallback", post(search::fallback))
}
