//! Route definitions for share links.

use axum::routing::{delete, get};
use axum::Router;

use crate::handlers::share;
use crate::state::AppState;

/// Owner routes mounted at `/shares` (auth required).
///
/// ```text
/// GET    /        -> list
/// POST   /        -> create
/// DELETE /{id}    -> revoke
/// ```
pub fn owner_router() -> Router<AppState> {
    Router::new()
        .route("/", get(share::list).post(share::create))
        .route("/{id}", delete(share::revoke))
}

/// Public routes mounted at `/shared` (no auth).
///
/// ```text
/// GET /{token}                -> resolve
/// GET /{token}/restaurants    -> restaurants (?sort, view)
/// ```
pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/{token}", get(share::resolve))
        .route("/{token}/restaurants", get(share::restaurants))
}
