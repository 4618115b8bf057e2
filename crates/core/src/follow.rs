//! Follow relationships.
//!
//! A follow starts as a `pending` request and becomes `accepted` when the
//! followee approves it. Rejecting a request deletes it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::DbId;

pub const STATUS_PENDING: &str = "pending";
pub const STATUS_ACCEPTED: &str = "accepted";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FollowStatus {
    Pending,
    Accepted,
}

impl FollowStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            FollowStatus::Pending => STATUS_PENDING,
            FollowStatus::Accepted => STATUS_ACCEPTED,
        }
    }
}

impl fmt::Display for FollowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FollowStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            STATUS_PENDING => Ok(FollowStatus::Pending),
            STATUS_ACCEPTED => Ok(FollowStatus::Accepted),
            other => Err(CoreError::Internal(format!("Unknown follow status: '{other}'"))),
        }
    }
}

/// Reject self-follows.
pub fn validate_follow(follower_id: DbId, followee_id: DbId) -> Result<(), CoreError> {
    if follower_id == followee_id {
        return Err(CoreError::Validation("You cannot follow yourself".to_string()));
    }
    Ok(())
}

/// Whether `viewer` may read `owner`'s favorites list.
///
/// Owners always can; others need an accepted follow.
pub fn can_view_list(viewer_id: DbId, owner_id: DbId, status: Option<FollowStatus>) -> bool {
    viewer_id == owner_id || status == Some(FollowStatus::Accepted)
}
