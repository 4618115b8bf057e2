//! Follow relationship model.

use mineruca_core::follow::FollowStatus;
use mineruca_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `follows` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Follow {
    pub id: DbId,
    pub follower_id: DbId,
    pub followee_id: DbId,
    pub status: String,
    pub accepted_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Follow {
    pub fn status(&self) -> Option<FollowStatus> {
        self.status.parse().ok()
    }

    pub fn is_accepted(&self) -> bool {
        self.status() == Some(FollowStatus::Accepted)
    }
}

/// A pending request as shown to the followee.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct FollowRequest {
    pub id: DbId,
    pub follower_id: DbId,
    pub follower_username: String,
    pub created_at: Timestamp,
}
