//! Shared query parameter types for API handlers.

use mineruca_core::filter::FilterSet;
use mineruca_core::pipeline::ViewMode;
use mineruca_core::sort::SortSpec;
use serde::Deserialize;

use crate::error::AppResult;

/// Generic pagination parameters (`?limit=&offset=`).
///
/// Values are clamped with `clamp_limit` / `clamp_offset` before use.
#[derive(Debug, Deserialize)]
pub struct PaginationParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Parameters of the favorites list endpoints.
///
/// `prefectures`, `cities` and `genres` are comma-separated; `sort` uses the
/// `field:dir,field:dir` wire form; `view` is `list` or `map`.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub prefectures: Option<String>,
    pub cities: Option<String>,
    pub genres: Option<String>,
    pub sort: Option<String>,
    pub view: Option<String>,
}

impl ListParams {
    pub fn filters(&self) -> FilterSet {
        FilterSet::from_query(
            self.prefectures.as_deref(),
            self.cities.as_deref(),
            self.genres.as_deref(),
        )
    }

    pub fn sort(&self) -> AppResult<SortSpec> {
        Ok(self.sort.as_deref().unwrap_or_default().parse()?)
    }

    pub fn view_mode(&self) -> AppResult<ViewMode> {
        match self.view.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
            Some(view) => Ok(view.parse()?),
            None => Ok(ViewMode::default()),
        }
    }
}
