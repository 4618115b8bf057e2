//! Route definitions for the `/restaurants` resource.
//!
//! All endpoints require authentication and act on the caller's own list.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::restaurant;
use crate::state::AppState;

/// Routes mounted at `/restaurants`.
///
/// ```text
/// GET    /               -> list (?prefectures, cities, genres, sort, view)
/// POST   /               -> create
/// GET    /sidebar        -> sidebar
/// GET    /genres         -> genres
/// GET    /{id}           -> get_by_id
/// PATCH  /{id}           -> update
/// DELETE /{id}           -> delete
/// POST   /{id}/geocode   -> geocode
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(restaurant::list).post(restaurant::create))
        .route("/sidebar", get(restaurant::sidebar))
        .route("/genres", get(restaurant::genres))
        .route(
            "/{id}",
            get(restaurant::get_by_id)
                .patch(restaurant::update)
                .delete(restaurant::delete),
        )
        .route("/{id}/geocode", post(restaurant::geocode))
}
