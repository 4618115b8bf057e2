//! Read-only share links.
//!
//! A share exposes its owner's favorites, optionally narrowed by a filter
//! snapshot captured at creation. Viewers always see the owner's current
//! set; only the filters are frozen.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::filter::FilterSet;
use crate::types::Timestamp;

/// Generate an opaque, unguessable share token.
pub fn generate_token() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Whether a token has the shape of one we issue. Used to reject garbage
/// before touching the database.
pub fn is_well_formed_token(token: &str) -> bool {
    uuid::Uuid::parse_str(token).is_ok()
}

/// Resolve the requested lifetime against the configured default and cap.
pub fn resolve_expiry_days(
    requested: Option<i64>,
    default_days: i64,
    max_days: i64,
) -> Result<i64, CoreError> {
    let days = requested.unwrap_or(default_days);
    if days < 1 {
        return Err(CoreError::Validation(
            "Share expiry must be at least 1 day".to_string(),
        ));
    }
    if days > max_days {
        return Err(CoreError::Validation(format!(
            "Share expiry cannot exceed {max_days} days"
        )));
    }
    Ok(days)
}

pub fn expiry_from(now: Timestamp, days: i64) -> Timestamp {
    now + Duration::days(days)
}

/// Fail with [`CoreError::Gone`] once a share has expired.
pub fn ensure_active(expires_at: Timestamp, now: Timestamp) -> Result<(), CoreError> {
    if expires_at <= now {
        return Err(CoreError::Gone("This share link has expired".to_string()));
    }
    Ok(())
}

/// Request body for creating a share.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewShare {
    pub expires_in_days: Option<i64>,
    #[serde(default)]
    pub filters: Option<FilterSet>,
}

/// What a viewer of a share link learns about it.
#[derive(Debug, Clone, Serialize)]
pub struct SharedView {
    pub owner_username: String,
    pub expires_at: Timestamp,
    pub filters: FilterSet,
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::{TimeZone, Utc};

    use super::*;

    #[test]
    fn tokens_are_unique_uuids() {
        let a = generate_token();
        let b = generate_token();
        assert_ne!(a, b);
        assert!(is_well_formed_token(&a));
        assert!(!is_well_formed_token("not-a-token"));
    }

    #[test]
    fn expiry_defaults_and_caps() {
        assert_eq!(resolve_expiry_days(None, 7, 90).unwrap(), 7);
        assert_eq!(resolve_expiry_days(Some(30), 7, 90).unwrap(), 30);
        assert_matches!(resolve_expiry_days(Some(0), 7, 90), Err(CoreError::Validation(_)));
        assert_matches!(resolve_expiry_days(Some(91), 7, 90), Err(CoreError::Validation(_)));
    }

    #[test]
    fn expired_share_is_gone() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let expires = expiry_from(now, 7);
        assert!(ensure_active(expires, now).is_ok());
        assert_matches!(
            ensure_active(expires, expires + Duration::seconds(1)),
            Err(CoreError::Gone(_))
        );
        assert_matches!(ensure_active(expires, expires), Err(CoreError::Gone(_)));
    }

    #[test]
    fn new_share_accepts_missing_fields() {
        let share: NewShare = serde_json::from_str("{}").unwrap();
        assert!(share.expires_in_days.is_none());
        assert!(share.filters.is_none());
    }
}
