//! Route definitions for the `/admin` resource.
//!
//! Every handler requires the `admin` role.

use axum::routing::{get, patch, post};
use axum::Router;

use crate::handlers::admin;
use crate::state::AppState;

/// Routes mounted at `/admin`.
///
/// ```text
/// GET   /users          -> list_users (?limit, offset)
/// POST  /users/bulk     -> bulk_create_users
/// PATCH /users/{id}     -> update_user
/// GET   /usage          -> usage (?days)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(admin::list_users))
        .route("/users/bulk", post(admin::bulk_create_users))
        .route("/users/{id}", patch(admin::update_user))
        .route("/usage", get(admin::usage))
}
