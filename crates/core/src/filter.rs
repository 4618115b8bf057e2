//! Sidebar and genre filters.
//!
//! Sidebar entries are a union: a record survives if it matches ANY active
//! entry, whichever dimension the entry belongs to. The surviving set is
//! then intersected with the genre filter.

use serde::{Deserialize, Serialize};

use crate::restaurant::Restaurant;

/// One sidebar selection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum SidebarFilter {
    Prefecture(String),
    City(String),
}

impl SidebarFilter {
    pub fn matches(&self, restaurant: &Restaurant) -> bool {
        match self {
            SidebarFilter::Prefecture(value) => restaurant.prefecture == *value,
            SidebarFilter::City(value) => restaurant.city == *value,
        }
    }
}

/// The full active filter state. Also the payload of a share snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSet {
    #[serde(default)]
    pub sidebar_filters: Vec<SidebarFilter>,
    #[serde(default)]
    pub genre_filters: Vec<String>,
}

impl FilterSet {
    /// Build a filter set from comma-separated query values.
    ///
    /// Blank items are ignored; duplicates collapse.
    pub fn from_query(
        prefectures: Option<&str>,
        cities: Option<&str>,
        genres: Option<&str>,
    ) -> Self {
        let mut set = Self::default();
        for value in split_list(prefectures) {
            set.toggle_sidebar(SidebarFilter::Prefecture(value), true);
        }
        for value in split_list(cities) {
            set.toggle_sidebar(SidebarFilter::City(value), true);
        }
        for value in split_list(genres) {
            set.toggle_genre(&value, true);
        }
        set
    }

    pub fn is_empty(&self) -> bool {
        self.sidebar_filters.is_empty() && self.genre_filters.is_empty()
    }

    /// Add (`on = true`) or remove a sidebar entry.
    pub fn toggle_sidebar(&mut self, filter: SidebarFilter, on: bool) {
        let present = self.sidebar_filters.contains(&filter);
        if on && !present {
            self.sidebar_filters.push(filter);
        } else if !on && present {
            self.sidebar_filters.retain(|f| *f != filter);
        }
    }

    /// Add (`on = true`) or remove a genre entry.
    pub fn toggle_genre(&mut self, genre: &str, on: bool) {
        let present = self.genre_filters.iter().any(|g| g == genre);
        if on && !present {
            self.genre_filters.push(genre.to_string());
        } else if !on && present {
            self.genre_filters.retain(|g| g != genre);
        }
    }

    /// Sidebar OR: no entries means no restriction.
    pub fn matches_sidebar(&self, restaurant: &Restaurant) -> bool {
        self.sidebar_filters.is_empty()
            || self.sidebar_filters.iter().any(|f| f.matches(restaurant))
    }

    /// Genre intersection: no entries means no restriction.
    pub fn matches_genres(&self, restaurant: &Restaurant) -> bool {
        self.genre_filters.is_empty()
            || restaurant
                .genres
                .iter()
                .any(|g| self.genre_filters.contains(g))
    }

    pub fn matches(&self, restaurant: &Restaurant) -> bool {
        self.matches_sidebar(restaurant) && self.matches_genres(restaurant)
    }
}

fn split_list(raw: Option<&str>) -> impl Iterator<Item = String> + '_ {
    raw.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
