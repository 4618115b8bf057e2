//! Search log rows and the admin usage aggregate.

use mineruca_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// DTO for recording a completed search.
pub struct CreateSearchLog {
    pub user_id: DbId,
    pub prefecture: String,
    pub keyword: Option<String>,
    pub primary_count: i32,
    pub fallback_used: bool,
    pub result_count: i32,
}

/// Per-user activity for the admin usage report.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UserUsage {
    pub user_id: DbId,
    pub username: String,
    pub search_count: i64,
    pub fallback_count: i64,
    pub restaurant_count: i64,
    pub last_search_at: Option<Timestamp>,
}
