//! Repository for the `follows` table.

use mineruca_core::types::DbId;
use sqlx::PgPool;

use crate::models::follow::{Follow, FollowRequest};
use crate::models::user::UserSummary;

const COLUMNS: &str =
    "id, follower_id, followee_id, status, accepted_at, created_at, updated_at";

/// Follow requests and accepted relationships.
pub struct FollowRepo;

impl FollowRepo {
    /// Create a pending follow request.
    ///
    /// Fails with a `uq_follows_pair` unique violation if a request or
    /// relationship already exists.
    pub async fn request(
        pool: &PgPool,
        follower_id: DbId,
        followee_id: DbId,
    ) -> Result<Follow, sqlx::Error> {
        let query = format!(
            "INSERT INTO follows (follower_id, followee_id)
             VALUES ($1, $2)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Follow>(&query)
            .bind(follower_id)
            .bind(followee_id)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Follow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM follows WHERE id = $1");
        sqlx::query_as::<_, Follow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// The relationship from `follower_id` to `followee_id`, in any status.
    pub async fn find_pair(
        pool: &PgPool,
        follower_id: DbId,
        followee_id: DbId,
    ) -> Result<Option<Follow>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM follows WHERE follower_id = $1 AND followee_id = $2");
        sqlx::query_as::<_, Follow>(&query)
            .bind(follower_id)
            .bind(followee_id)
            .fetch_optional(pool)
            .await
    }

    /// Accept a pending request addressed to `followee_id`.
    ///
    /// Returns `None` if no such pending request exists.
    pub async fn accept(
        pool: &PgPool,
        id: DbId,
        followee_id: DbId,
    ) -> Result<Option<Follow>, sqlx::Error> {
        let query = format!(
            "UPDATE follows SET status = 'accepted', accepted_at = NOW()
             WHERE id = $1 AND followee_id = $2 AND status = 'pending'
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Follow>(&query)
            .bind(id)
            .bind(followee_id)
            .fetch_optional(pool)
            .await
    }

    /// Reject (delete) a pending request addressed to `followee_id`.
    pub async fn reject(pool: &PgPool, id: DbId, followee_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM follows WHERE id = $1 AND followee_id = $2 AND status = 'pending'",
        )
        .bind(id)
        .bind(followee_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Remove a relationship or withdraw a pending request.
    pub async fn unfollow(
        pool: &PgPool,
        follower_id: DbId,
        followee_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM follows WHERE follower_id = $1 AND followee_id = $2")
            .bind(follower_id)
            .bind(followee_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Pending requests addressed to `user_id`, oldest first.
    pub async fn incoming_requests(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<FollowRequest>, sqlx::Error> {
        sqlx::query_as::<_, FollowRequest>(
            "SELECT f.id, f.follower_id, u.username AS follower_username, f.created_at
             FROM follows f
             JOIN users u ON u.id = f.follower_id
             WHERE f.followee_id = $1 AND f.status = 'pending'
             ORDER BY f.created_at, f.id",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// Users with an accepted follow of `user_id`.
    pub async fn followers(pool: &PgPool, user_id: DbId) -> Result<Vec<UserSummary>, sqlx::Error> {
        sqlx::query_as::<_, UserSummary>(
            "SELECT u.id, u.username
             FROM follows f
             JOIN users u ON u.id = f.follower_id
             WHERE f.followee_id = $1 AND f.status = 'accepted'
             ORDER BY u.username",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// Users `user_id` follows with an accepted relationship.
    pub async fn following(pool: &PgPool, user_id: DbId) -> Result<Vec<UserSummary>, sqlx::Error> {
        sqlx::query_as::<_, UserSummary>(
            "SELECT u.id, u.username
             FROM follows f
             JOIN users u ON u.id = f.followee_id
             WHERE f.follower_id = $1 AND f.status = 'accepted'
             ORDER BY u.username",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// IDs of accepted followers, for realtime fan-out.
    pub async fn follower_ids(pool: &PgPool, user_id: DbId) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT follower_id FROM follows WHERE followee_id = $1 AND status = 'accepted'",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }
}
