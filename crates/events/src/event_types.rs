//! Event names published by the API handlers.

pub const RESTAURANT_CREATED: &str = "restaurant.created";
pub const RESTAURANT_UPDATED: &str = "restaurant.updated";
pub const RESTAURANT_DELETED: &str = "restaurant.deleted";

/// Someone asked to follow the target user.
pub const FOLLOW_REQUESTED: &str = "follow.requested";
/// The target user's request was accepted by the actor.
pub const FOLLOW_ACCEPTED: &str = "follow.accepted";
pub const FOLLOW_REMOVED: &str = "follow.removed";

pub const SHARE_CREATED: &str = "share.created";
pub const SHARE_REVOKED: &str = "share.revoked";

/// Whether the event changes a user's favorites list.
pub fn is_restaurant_event(event_type: &str) -> bool {
    event_type.starts_with("restaurant.")
}
