//! Notification entity model and DTOs.

use mineruca_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `notifications` table, joined with the actor's username.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Notification {
    pub id: DbId,
    pub user_id: DbId,
    pub actor_id: Option<DbId>,
    pub actor_username: Option<String>,
    pub kind: String,
    pub entity_id: Option<DbId>,
    pub payload: serde_json::Value,
    pub is_read: bool,
    pub read_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

/// DTO for inserting a notification.
pub struct CreateNotification {
    pub user_id: DbId,
    pub actor_id: Option<DbId>,
    pub kind: String,
    pub entity_id: Option<DbId>,
    pub payload: serde_json::Value,
}
