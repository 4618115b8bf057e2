//! Refresh-token sessions (`user_sessions`).

use mineruca_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::session::{CreateSession, UserSession};

const COLUMNS: &str =
    "id, user_id, refresh_token_hash, expires_at, is_revoked, created_at, updated_at";

pub struct SessionRepo;

impl SessionRepo {
    pub async fn create(pool: &PgPool, input: &CreateSession) -> Result<UserSession, sqlx::Error> {
        let query = format!(
            "INSERT INTO user_sessions (user_id, refresh_token_hash, expires_at)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, UserSession>(&query)
            .bind(input.user_id)
            .bind(&input.refresh_token_hash)
            .bind(input.expires_at)
            .fetch_one(pool)
            .await
    }

    /// The live session for a presented refresh token. Revoked and expired
    /// rows never match.
    pub async fn find_live_by_hash(
        pool: &PgPool,
        hash: &str,
    ) -> Result<Option<UserSession>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM user_sessions
             WHERE refresh_token_hash = $1
               AND NOT is_revoked
               AND expires_at > NOW()"
        );
        sqlx::query_as::<_, UserSession>(&query)
            .bind(hash)
            .fetch_optional(pool)
            .await
    }

    /// `false` if the session was already revoked.
    pub async fn revoke(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("UPDATE user_sessions SET is_revoked = true WHERE id = $1 AND NOT is_revoked")
                .bind(id)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() == 1)
    }

    /// Sign a user out everywhere (logout-all, deactivation).
    pub async fn revoke_all_for_user(pool: &PgPool, user_id: DbId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE user_sessions SET is_revoked = true WHERE user_id = $1 AND NOT is_revoked",
        )
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Delete expired sessions and sessions revoked before `revoked_before`.
    /// Returns the number of rows removed.
    pub async fn purge_dead(
        pool: &PgPool,
        revoked_before: Timestamp,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM user_sessions
             WHERE expires_at <= NOW()
                OR (is_revoked AND updated_at < $1)",
        )
        .bind(revoked_before)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }
}
