//! Repository for the `restaurants` table.

use mineruca_core::restaurant::{normalize_genres, Coordinates, NewRestaurant, RestaurantPatch};
use mineruca_core::types::DbId;
use sqlx::PgPool;

use crate::models::restaurant::{RestaurantRow, TimelineRow};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, name, address, hours, price_min, price_max, is_closed, \
                        latitude, longitude, prefecture, city, website, sources, visit_count, \
                        comment, custom_url, genres, created_at, updated_at";

/// Provides CRUD operations for favorite restaurants.
///
/// Every mutation is scoped by `user_id`: only the owner can change a row.
pub struct RestaurantRepo;

impl RestaurantRepo {
    /// Insert a new favorite for `user_id`, returning the created row.
    pub async fn create(
        pool: &PgPool,
        user_id: DbId,
        input: &NewRestaurant,
    ) -> Result<RestaurantRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO restaurants
                (user_id, name, address, hours, price_min, price_max, is_closed,
                 latitude, longitude, prefecture, city, website, sources,
                 visit_count, comment, custom_url, genres)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
             RETURNING {COLUMNS}"
        );
        // The (0, 0) sentinel is never written.
        let coords = input
            .coordinates
            .and_then(|c| Coordinates::from_parts(Some(c.latitude), Some(c.longitude)));
        let sources = serde_json::to_value(&input.sources).unwrap_or_default();
        let custom_url = input
            .custom_url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty());

        sqlx::query_as::<_, RestaurantRow>(&query)
            .bind(user_id)
            .bind(input.name.trim())
            .bind(&input.address)
            .bind(&input.hours)
            .bind(input.price_range.and_then(|p| p.min))
            .bind(input.price_range.and_then(|p| p.max))
            .bind(input.is_closed)
            .bind(coords.map(|c| c.latitude))
            .bind(coords.map(|c| c.longitude))
            .bind(input.prefecture.trim())
            .bind(input.city.trim())
            .bind(&input.website)
            .bind(sources)
            .bind(input.visit_count)
            .bind(&input.comment)
            .bind(custom_url)
            .bind(normalize_genres(&input.genres))
            .fetch_one(pool)
            .await
    }

    /// Find a restaurant by ID regardless of owner.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<RestaurantRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM restaurants WHERE id = $1");
        sqlx::query_as::<_, RestaurantRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// All favorites of a user, newest first. This is the authoritative
    /// source order the list pipeline starts from.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<RestaurantRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM restaurants
             WHERE user_id = $1
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, RestaurantRow>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Apply a partial update. Only non-`None` fields in `patch` are applied.
    ///
    /// Coordinates and price range are replaced as a pair; a `(0, 0)`
    /// coordinate patch clears them. An empty `custom_url` clears the link.
    /// Returns `None` if the row does not exist or is owned by someone else.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        user_id: DbId,
        patch: &RestaurantPatch,
    ) -> Result<Option<RestaurantRow>, sqlx::Error> {
        let query = format!(
            "UPDATE restaurants SET
                visit_count = COALESCE($3, visit_count),
                comment = COALESCE($4, comment),
                custom_url = CASE WHEN $5::text IS NULL THEN custom_url ELSE NULLIF(TRIM($5), '') END,
                genres = COALESCE($6, genres),
                latitude = CASE WHEN $7 THEN $8 ELSE latitude END,
                longitude = CASE WHEN $7 THEN $9 ELSE longitude END,
                price_min = CASE WHEN $10 THEN $11 ELSE price_min END,
                price_max = CASE WHEN $10 THEN $12 ELSE price_max END,
                is_closed = COALESCE($13, is_closed)
             WHERE id = $1 AND user_id = $2
             RETURNING {COLUMNS}"
        );
        let coords = patch
            .coordinates
            .and_then(|c| Coordinates::from_parts(Some(c.latitude), Some(c.longitude)));

        sqlx::query_as::<_, RestaurantRow>(&query)
            .bind(id)
            .bind(user_id)
            .bind(patch.visit_count)
            .bind(&patch.comment)
            .bind(&patch.custom_url)
            .bind(patch.genres.as_deref().map(normalize_genres))
            .bind(patch.coordinates.is_some())
            .bind(coords.map(|c| c.latitude))
            .bind(coords.map(|c| c.longitude))
            .bind(patch.price_range.is_some())
            .bind(patch.price_range.and_then(|p| p.min))
            .bind(patch.price_range.and_then(|p| p.max))
            .bind(patch.is_closed)
            .fetch_optional(pool)
            .await
    }

    /// Hard-delete a favorite. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId, user_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM restaurants WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Recent favorites of everyone `viewer_id` follows (accepted only).
    pub async fn timeline(
        pool: &PgPool,
        viewer_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<TimelineRow>, sqlx::Error> {
        let columns = COLUMNS
            .split(", ")
            .map(|c| format!("r.{}", c.trim()))
            .collect::<Vec<_>>()
            .join(", ");
        let query = format!(
            "SELECT u.username, {columns}
             FROM restaurants r
             JOIN follows f ON f.followee_id = r.user_id
             JOIN users u ON u.id = r.user_id
             WHERE f.follower_id = $1 AND f.status = 'accepted'
             ORDER BY r.created_at DESC, r.id DESC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, TimelineRow>(&query)
            .bind(viewer_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }
}
