//! Restaurant rows and their conversion into the domain model.

use mineruca_core::restaurant::{parse_sources, Coordinates, PriceRange, Restaurant};
use mineruca_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `restaurants` table.
///
/// Coordinates and price range are flat nullable columns here; the domain
/// model groups them. `sources` is raw JSONB because some rows hold the
/// citation array double-encoded as a string.
#[derive(Debug, Clone, FromRow)]
pub struct RestaurantRow {
    pub id: DbId,
    pub user_id: DbId,
    pub name: String,
    pub address: String,
    pub hours: String,
    pub price_min: Option<i32>,
    pub price_max: Option<i32>,
    pub is_closed: bool,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub prefecture: String,
    pub city: String,
    pub website: Option<String>,
    pub sources: serde_json::Value,
    pub visit_count: i32,
    pub comment: String,
    pub custom_url: Option<String>,
    pub genres: Vec<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl RestaurantRow {
    pub fn into_domain(self) -> Restaurant {
        Restaurant {
            id: self.id,
            user_id: self.user_id,
            name: self.name,
            address: self.address,
            hours: self.hours,
            price_range: PriceRange::from_parts(self.price_min, self.price_max),
            is_closed: self.is_closed,
            coordinates: Coordinates::from_parts(self.latitude, self.longitude),
            prefecture: self.prefecture,
            city: self.city,
            website: self.website,
            sources: parse_sources(&self.sources),
            visit_count: self.visit_count,
            comment: self.comment,
            custom_url: self.custom_url,
            genres: self.genres,
            created_at: self.created_at,
        }
    }
}

/// A restaurant row joined with its owner's username, for the timeline.
#[derive(Debug, Clone, FromRow)]
pub struct TimelineRow {
    pub username: String,
    #[sqlx(flatten)]
    pub restaurant: RestaurantRow,
}

/// Timeline entry as returned to clients.
#[derive(Debug, Clone, Serialize)]
pub struct TimelineEntry {
    pub username: String,
    pub restaurant: Restaurant,
}

impl From<TimelineRow> for TimelineEntry {
    fn from(row: TimelineRow) -> Self {
        Self {
            username: row.username,
            restaurant: row.restaurant.into_domain(),
        }
    }
}
