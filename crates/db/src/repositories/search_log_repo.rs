//! Repository for the `search_logs` table and the usage report built on it.

use mineruca_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::search_log::{CreateSearchLog, UserUsage};

pub struct SearchLogRepo;

impl SearchLogRepo {
    /// Record a completed search, returning the generated ID.
    pub async fn create(pool: &PgPool, input: &CreateSearchLog) -> Result<DbId, sqlx::Error> {
        sqlx::query_scalar(
            "INSERT INTO search_logs
                (user_id, prefecture, keyword, primary_count, fallback_used, result_count)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING id",
        )
        .bind(input.user_id)
        .bind(&input.prefecture)
        .bind(&input.keyword)
        .bind(input.primary_count)
        .bind(input.fallback_used)
        .bind(input.result_count)
        .fetch_one(pool)
        .await
    }

    /// Per-user search and favorites counts, busiest searchers first.
    ///
    /// Only searches at or after `since` are counted; favorites are always
    /// the current total.
    pub async fn usage_report(
        pool: &PgPool,
        since: Timestamp,
    ) -> Result<Vec<UserUsage>, sqlx::Error> {
        sqlx::query_as::<_, UserUsage>(
            "SELECT u.id AS user_id,
                    u.username,
                    COALESCE(s.search_count, 0) AS search_count,
                    COALESCE(s.fallback_count, 0) AS fallback_count,
                    COALESCE(r.restaurant_count, 0) AS restaurant_count,
                    s.last_search_at
             FROM users u
             LEFT JOIN (
                 SELECT user_id,
                        COUNT(*) AS search_count,
                        COUNT(*) FILTER (WHERE fallback_used) AS fallback_count,
                        MAX(created_at) AS last_search_at
                 FROM search_logs
                 WHERE created_at >= $1
                 GROUP BY user_id
             ) s ON s.user_id = u.id
             LEFT JOIN (
                 SELECT user_id, COUNT(*) AS restaurant_count
                 FROM restaurants
                 GROUP BY user_id
             ) r ON r.user_id = u.id
             ORDER BY search_count DESC, u.username",
        )
        .bind(since)
        .fetch_all(pool)
        .await
    }
}
