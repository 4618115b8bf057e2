pub mod admin;
pub mod auth;
pub mod health;
pub mod notification;
pub mod restaurant;
pub mod search;
pub mod share;
pub mod user;

use axum::routing::{get, post};
use axum::Router;

use crate::handlers;
use crate::state::AppState;
use crate::ws;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /ws?token=                                 WebSocket refresh channel
///
/// /auth/signup                               signup (public)
/// /auth/login                                login (public)
/// /auth/refresh                              refresh (public)
/// /auth/logout                               logout
/// /auth/me                                   current user
///
/// /restaurants                               list, create
/// /restaurants/sidebar                       prefecture/city tree
/// /restaurants/genres                        distinct genre tags
/// /restaurants/{id}                          get, update, delete
/// /restaurants/{id}/geocode                  geocode stored address (POST)
///
/// /geocode                                   geocode free text (POST)
///
/// /search                                    start search (POST)
/// /search/{id}                               current state (GET)
/// /search/{id}/fallback                      manual fallback (POST)
///
/// /shares                                    list, create
/// /shares/{id}                               revoke (DELETE)
/// /shared/{token}                            resolve (public)
/// /shared/{token}/restaurants                shared list (public)
///
/// /users/search                              find by username prefix
/// /users/{id}/follow                         follow, unfollow (POST, DELETE)
/// /users/{id}/followers                      accepted followers
/// /users/{id}/following                      accepted followees
/// /users/{id}/restaurants                    a followed user's list
///
/// /follows/requests                          incoming requests
/// /follows/requests/{id}/accept              accept (POST)
/// /follows/requests/{id}/reject              reject (POST)
///
/// /timeline                                  followed users' recent favorites
///
/// /notifications                             list (?unread_only, limit, offset)
/// /notifications/read-all                    mark all read (POST)
/// /notifications/unread-count                unread count (GET)
/// /notifications/{id}/read                   mark read (POST)
///
/// /chat                                      restaurant chat (POST)
///
/// /admin/users                               list (admin only)
/// /admin/users/bulk                          bulk create (POST)
/// /admin/users/{id}                          update role/status (PATCH)
/// /admin/usage                               usage report (?days)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // WebSocket endpoint (token in query string).
        .route("/ws", get(ws::ws_handler))
        .nest("/auth", auth::router())
        .nest("/restaurants", restaurant::router())
        .route("/geocode", post(handlers::geocode::geocode))
        .nest("/search", search::router())
        .nest("/shares", share::owner_router())
        .nest("/shared", share::public_router())
        .nest("/users", user::router())
        .nest("/follows", user::follow_router())
        .route("/timeline", get(handlers::timeline::timeline))
        .nest("/notifications", notification::router())
        .route("/chat", post(handlers::chat::chat))
        .nest("/admin", admin::router())
}
