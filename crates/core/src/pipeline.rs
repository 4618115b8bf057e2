//! Filter/sort/derive pipeline.
//!
//! [`derive_visible`] turns the authoritative restaurant set for a viewing
//! context into the exact ordered list to render. It never mutates its input.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::filter::FilterSet;
use crate::prefecture::prefecture_sort_rank;
use crate::restaurant::Restaurant;
use crate::sort::{compare_locale, SortSpec};

/// How the favorites are being displayed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    List,
    Map,
}

impl FromStr for ViewMode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "list" => Ok(ViewMode::List),
            "map" => Ok(ViewMode::Map),
            other => Err(CoreError::Validation(format!("Unknown view mode: '{other}'"))),
        }
    }
}

/// Produce the rendered list.
///
/// 1. Map view drops closed restaurants.
/// 2. Sidebar filters (union of entries).
/// 3. Genre filters (intersection with the tag set).
/// 4. Stable multi-key sort.
pub fn derive_visible(
    restaurants: &[Restaurant],
    filters: &FilterSet,
    sort: &SortSpec,
    mode: ViewMode,
) -> Vec<Restaurant> {
    let mut visible: Vec<Restaurant> = restaurants
        .iter()
        .filter(|r| mode != ViewMode::Map || !r.is_closed)
        .filter(|r| filters.matches_sidebar(r))
        .filter(|r| filters.matches_genres(r))
        .cloned()
        .collect();
    sort.sort(&mut visible);
    visible
}

// ---------------------------------------------------------------------------
// Sidebar tree
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CityCount {
    pub city: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrefectureGroup {
    pub prefecture: String,
    pub count: usize,
    pub cities: Vec<CityCount>,
}

/// Group restaurants into the prefecture → city tree shown in the sidebar.
///
/// Prefectures follow the canonical order, cities the locale comparison.
pub fn sidebar_tree(restaurants: &[Restaurant]) -> Vec<PrefectureGroup> {
    let mut groups: Vec<PrefectureGroup> = Vec::new();
    for r in restaurants {
        let idx = match groups.iter().position(|g| g.prefecture == r.prefecture) {
            Some(idx) => idx,
            None => {
                groups.push(PrefectureGroup {
                    prefecture: r.prefecture.clone(),
                    count: 0,
                    cities: Vec::new(),
                });
                groups.len() - 1
            }
        };
        let group = &mut groups[idx];
        group.count += 1;
        match group.cities.iter_mut().find(|c| c.city == r.city) {
            Some(city) => city.count += 1,
            None => group.cities.push(CityCount {
                city: r.city.clone(),
                count: 1,
            }),
        }
    }

    groups.sort_by(|a, b| {
        prefecture_sort_rank(&a.prefecture)
            .cmp(&prefecture_sort_rank(&b.prefecture))
            .then_with(|| compare_locale(&a.prefecture, &b.prefecture))
    });
    for group in &mut groups {
        group.cities.sort_by(|a, b| compare_locale(&a.city, &b.city));
    }
    groups
}

/// Distinct genre tags across all restaurants, in first-seen order.
pub fn distinct_genres(restaurants: &[Restaurant]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for genre in restaurants.iter().flat_map(|r| r.genres.iter()) {
        if !out.contains(genre) {
            out.push(genre.clone());
        }
    }
    out
}
