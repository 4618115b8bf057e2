//! Notification kinds and realtime refresh frames.

use serde::{Deserialize, Serialize};

/// Someone asked to follow the recipient.
pub const KIND_FOLLOW_REQUEST: &str = "follow_request";

/// The recipient's follow request was accepted.
pub const KIND_FOLLOW_ACCEPTED: &str = "follow_accepted";

pub const VALID_KINDS: &[&str] = &[KIND_FOLLOW_REQUEST, KIND_FOLLOW_ACCEPTED];

pub fn is_valid_kind(kind: &str) -> bool {
    VALID_KINDS.contains(&kind)
}

/// Which client-side data set a refresh frame invalidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RefreshScope {
    Restaurants,
    Timeline,
    Notifications,
    Follows,
    Shares,
}

/// `{"type":"refresh","scope":"..."}` pushed over the WebSocket.
///
/// Clients respond with a full refetch of the scope; the last refresh wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshFrame {
    #[serde(rename = "type")]
    pub frame_type: String,
    pub scope: RefreshScope,
}

impl RefreshFrame {
    pub fn new(scope: RefreshScope) -> Self {
        Self {
            frame_type: "refresh".to_string(),
            scope,
        }
    }

    pub fn to_text(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}
