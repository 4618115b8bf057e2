//! Route definitions for `/users` and `/follows`.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{follow, user};
use crate::state::AppState;

/// Routes mounted at `/users`.
///
/// ```text
/// GET    /search              -> search (?q, limit)
/// POST   /{id}/follow         -> follow
/// DELETE /{id}/follow         -> unfollow
/// GET    /{id}/followers      -> followers
/// GET    /{id}/following      -> following
/// GET    /{id}/restaurants    -> restaurants (accepted followers only)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/search", get(user::search))
        .route("/{id}/follow", post(user::follow).delete(user::unfollow))
        .route("/{id}/followers", get(user::followers))
        .route("/{id}/following", get(user::following))
        .route("/{id}/restaurants", get(user::restaurants))
}

/// Routes mounted at `/follows`.
///
/// ```text
/// GET  /requests                -> list_requests
/// POST /requests/{id}/accept    -> accept
/// POST /requests/{id}/reject    -> reject
/// ```
pub fn follow_router() -> Router<AppState> {
    Router::new()
        .route("/requests", get(follow::list_requests))
        .route("/requests/{id}/accept", post(follow::accept))
        .route("/requests/{id}/reject", post(follow::reject))
}
