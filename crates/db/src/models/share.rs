//! Share link model and DTOs.

use mineruca_core::filter::FilterSet;
use mineruca_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `shares` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Share {
    pub id: DbId,
    pub token: String,
    pub user_id: DbId,
    /// Filter snapshot, `NULL` when the whole list is shared.
    pub filters: Option<serde_json::Value>,
    pub expires_at: Timestamp,
    pub created_at: Timestamp,
}

impl Share {
    /// Decode the stored snapshot. Missing or malformed data means no filters.
    pub fn snapshot(&self) -> FilterSet {
        self.filters
            .as_ref()
            .and_then(|v| serde_json::from_value(v.clone()).ok())
            .unwrap_or_default()
    }
}

/// DTO for inserting a share.
pub struct CreateShare {
    pub token: String,
    pub user_id: DbId,
    pub filters: Option<serde_json::Value>,
    pub expires_at: Timestamp,
}
