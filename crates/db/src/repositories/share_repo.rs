//! Repository for the `shares` table.

use mineruca_core::types::DbId;
use sqlx::PgPool;

use crate::models::share::{CreateShare, Share};

const COLUMNS: &str = "id, token, user_id, filters, expires_at, created_at";

pub struct ShareRepo;

impl ShareRepo {
    /// Insert a new share, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateShare) -> Result<Share, sqlx::Error> {
        let query = format!(
            "INSERT INTO shares (token, user_id, filters, expires_at)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Share>(&query)
            .bind(&input.token)
            .bind(input.user_id)
            .bind(&input.filters)
            .bind(input.expires_at)
            .fetch_one(pool)
            .await
    }

    /// Look up a share by its public token. Expired shares are still
    /// returned so callers can distinguish "expired" from "unknown".
    pub async fn find_by_token(pool: &PgPool, token: &str) -> Result<Option<Share>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM shares WHERE token = $1");
        sqlx::query_as::<_, Share>(&query)
            .bind(token)
            .fetch_optional(pool)
            .await
    }

    /// A user's shares, newest first.
    pub async fn list_for_user(pool: &PgPool, user_id: DbId) -> Result<Vec<Share>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM shares WHERE user_id = $1 ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Share>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Revoke a share. Returns `true` if a row owned by `user_id` was removed.
    pub async fn delete(pool: &PgPool, id: DbId, user_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM shares WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
