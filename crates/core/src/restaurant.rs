//! Restaurant (favorite entry) domain model, patches, and validators.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Maximum length of a restaurant name in characters.
pub const MAX_NAME_LENGTH: usize = 200;

/// Maximum length of a user comment in characters.
pub const MAX_COMMENT_LENGTH: usize = 2_000;

/// Maximum number of genre tags on one restaurant.
pub const MAX_GENRES: usize = 20;

/// Maximum length of a single genre tag in characters.
pub const MAX_GENRE_LENGTH: usize = 40;

// ---------------------------------------------------------------------------
// Value types
// ---------------------------------------------------------------------------

/// A geographic position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    /// Build coordinates from nullable columns.
    ///
    /// Returns `None` if either side is missing or for the `(0, 0)` sentinel
    /// that older rows use to mean "not geocoded".
    pub fn from_parts(latitude: Option<f64>, longitude: Option<f64>) -> Option<Self> {
        match (latitude, longitude) {
            (Some(lat), Some(lng)) if !(lat == 0.0 && lng == 0.0) => Some(Self {
                latitude: lat,
                longitude: lng,
            }),
            _ => None,
        }
    }

    /// Check both axes are within WGS84 bounds.
    pub fn validate(&self) -> Result<(), CoreError> {
        if !(-90.0..=90.0).contains(&self.latitude) || !(-180.0..=180.0).contains(&self.longitude)
        {
            return Err(CoreError::Validation(format!(
                "Coordinates out of range: ({}, {})",
                self.latitude, self.longitude
            )));
        }
        Ok(())
    }
}

/// Structured price range in yen. Either bound may be open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: Option<i32>,
    pub max: Option<i32>,
}

impl PriceRange {
    /// Build a range from nullable columns, `None` when both are missing.
    pub fn from_parts(min: Option<i32>, max: Option<i32>) -> Option<Self> {
        if min.is_none() && max.is_none() {
            None
        } else {
            Some(Self { min, max })
        }
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.min.is_some_and(|v| v < 0) || self.max.is_some_and(|v| v < 0) {
            return Err(CoreError::Validation(
                "Price range bounds must not be negative".to_string(),
            ));
        }
        if let (Some(min), Some(max)) = (self.min, self.max) {
            if min > max {
                return Err(CoreError::Validation(format!(
                    "Price range minimum ({min}) exceeds maximum ({max})"
                )));
            }
        }
        Ok(())
    }
}

/// A web page cited as the source of a restaurant entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceCitation {
    pub uri: String,
    #[serde(default)]
    pub title: String,
}

/// Decode stored source citations.
///
/// Rows written by older clients hold the array serialized a second time as
/// a JSON string, so a string value is parsed again. Anything unreadable
/// decodes to an empty list.
pub fn parse_sources(value: &serde_json::Value) -> Vec<SourceCitation> {
    match value {
        serde_json::Value::String(raw) => serde_json::from_str::<serde_json::Value>(raw)
            .map(|inner| match inner {
                serde_json::Value::String(_) => Vec::new(),
                other => parse_sources(&other),
            })
            .unwrap_or_default(),
        serde_json::Value::Array(_) => {
            serde_json::from_value(value.clone()).unwrap_or_default()
        }
        _ => Vec::new(),
    }
}

/// Trim genre tags, drop blanks, and remove duplicates keeping first occurrence.
pub fn normalize_genres(genres: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(genres.len());
    for genre in genres {
        let tag = genre.trim();
        if !tag.is_empty() && !out.iter().any(|g| g == tag) {
            out.push(tag.to_string());
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Restaurant
// ---------------------------------------------------------------------------

/// A saved favorite restaurant as rendered to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Restaurant {
    pub id: DbId,
    pub user_id: DbId,
    pub name: String,
    pub address: String,
    pub hours: String,
    pub price_range: Option<PriceRange>,
    pub is_closed: bool,
    pub coordinates: Option<Coordinates>,
    pub prefecture: String,
    pub city: String,
    pub website: Option<String>,
    pub sources: Vec<SourceCitation>,
    pub visit_count: i32,
    pub comment: String,
    pub custom_url: Option<String>,
    pub genres: Vec<String>,
    pub created_at: Timestamp,
}

impl Restaurant {
    /// Apply the fields present in `patch`, leaving the rest untouched.
    pub fn apply_patch(&mut self, patch: &RestaurantPatch) {
        if let Some(count) = patch.visit_count {
            self.visit_count = count;
        }
        if let Some(comment) = &patch.comment {
            self.comment = comment.clone();
        }
        if let Some(url) = &patch.custom_url {
            self.custom_url = if url.trim().is_empty() {
                None
            } else {
                Some(url.clone())
            };
        }
        if let Some(genres) = &patch.genres {
            self.genres = normalize_genres(genres);
        }
        if let Some(coords) = patch.coordinates {
            self.coordinates = Coordinates::from_parts(Some(coords.latitude), Some(coords.longitude));
        }
        if let Some(range) = patch.price_range {
            self.price_range = PriceRange::from_parts(range.min, range.max);
        }
        if let Some(closed) = patch.is_closed {
            self.is_closed = closed;
        }
    }
}

/// Input for saving a new favorite.
#[derive(Debug, Clone, Deserialize)]
pub struct NewRestaurant {
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub hours: String,
    pub price_range: Option<PriceRange>,
    #[serde(default)]
    pub is_closed: bool,
    pub coordinates: Option<Coordinates>,
    pub prefecture: String,
    pub city: String,
    pub website: Option<String>,
    #[serde(default)]
    pub sources: Vec<SourceCitation>,
    #[serde(default)]
    pub visit_count: i32,
    #[serde(default)]
    pub comment: String,
    pub custom_url: Option<String>,
    #[serde(default)]
    pub genres: Vec<String>,
}

impl NewRestaurant {
    /// Validate required fields and bounds.
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_name(&self.name)?;
        if self.prefecture.trim().is_empty() || self.city.trim().is_empty() {
            return Err(CoreError::Validation(
                "Prefecture and city are required".to_string(),
            ));
        }
        validate_visit_count(self.visit_count)?;
        validate_comment(&self.comment)?;
        validate_genres(&self.genres)?;
        if let Some(coords) = &self.coordinates {
            coords.validate()?;
        }
        if let Some(range) = &self.price_range {
            range.validate()?;
        }
        Ok(())
    }
}

/// Partial update of the user-editable fields of a restaurant.
///
/// `None` means "leave unchanged". An empty `custom_url` clears the link.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RestaurantPatch {
    pub visit_count: Option<i32>,
    pub comment: Option<String>,
    pub custom_url: Option<String>,
    pub genres: Option<Vec<String>>,
    pub coordinates: Option<Coordinates>,
    pub price_range: Option<PriceRange>,
    pub is_closed: Option<bool>,
}

impl RestaurantPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// `true` when the patch touches coordinates and nothing else.
    pub fn is_coordinate_only(&self) -> bool {
        self.coordinates.is_some()
            && Self {
                coordinates: None,
                ..self.clone()
            }
            .is_empty()
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if let Some(count) = self.visit_count {
            validate_visit_count(count)?;
        }
        if let Some(comment) = &self.comment {
            validate_comment(comment)?;
        }
        if let Some(genres) = &self.genres {
            validate_genres(genres)?;
        }
        if let Some(coords) = &self.coordinates {
            coords.validate()?;
        }
        if let Some(range) = &self.price_range {
            range.validate()?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

pub fn validate_name(name: &str) -> Result<(), CoreError> {
    if name.trim().is_empty() {
        return Err(CoreError::Validation(
            "Restaurant name must not be empty".to_string(),
        ));
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(CoreError::Validation(format!(
            "Restaurant name exceeds maximum length of {MAX_NAME_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Visit counts are user-editable but never negative.
pub fn validate_visit_count(count: i32) -> Result<(), CoreError> {
    if count < 0 {
        return Err(CoreError::Validation(format!(
            "Visit count must not be negative (got {count})"
        )));
    }
    Ok(())
}

pub fn validate_comment(comment: &str) -> Result<(), CoreError> {
    if comment.chars().count() > MAX_COMMENT_LENGTH {
        return Err(CoreError::Validation(format!(
            "Comment exceeds maximum length of {MAX_COMMENT_LENGTH} characters"
        )));
    }
    Ok(())
}

pub fn validate_genres(genres: &[String]) -> Result<(), CoreError> {
    let normalized = normalize_genres(genres);
    if normalized.len() > MAX_GENRES {
        return Err(CoreError::Validation(format!(
            "At most {MAX_GENRES} genres are allowed (got {})",
            normalized.len()
        )));
    }
    if let Some(long) = normalized
        .iter()
        .find(|g| g.chars().count() > MAX_GENRE_LENGTH)
    {
        return Err(CoreError::Validation(format!(
            "Genre '{long}' exceeds maximum length of {MAX_GENRE_LENGTH} characters"
        )));
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::TimeZone;

    use super::*;

    /// Minimal restaurant for pipeline and view tests.
    pub fn restaurant(id: DbId, prefecture: &str, city: &str) -> Restaurant {
        Restaurant {
            id,
            user_id: 1,
            name: format!("Shop {id}"),
            address: format!("{prefecture}{city}1-1"),
            hours: String::new(),
            price_range: None,
            is_closed: false,
            coordinates: None,
            prefecture: prefecture.to_string(),
            city: city.to_string(),
            website: None,
            sources: Vec::new(),
            visit_count: 0,
            comment: String::new(),
            custom_url: None,
            genres: Vec::new(),
            created_at: chrono::Utc
                .with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
                .unwrap()
                + chrono::Duration::minutes(id),
        }
    }
}
