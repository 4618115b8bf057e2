//! Restaurant search: query/result types, merge rules, the per-search state
//! machine, and the primary → fallback orchestration.

pub mod orchestrator;
pub mod provider;
pub mod session;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::restaurant::{Coordinates, PriceRange, SourceCitation};

pub use orchestrator::SearchOrchestrator;
pub use provider::{ProviderError, RestaurantSearchProvider};
pub use session::{SearchOutcome, SearchPhase, SearchSession};

/// Maximum keyword length accepted from clients.
pub const MAX_KEYWORD_LENGTH: usize = 100;

/// A structured restaurant search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub prefecture: String,
    /// Provider area code narrowing the prefecture (Hotpepper middle area).
    pub area_code: Option<String>,
    /// Display name of the area, used by the fallback provider's prompt.
    pub area_name: Option<String>,
    /// Provider genre code (Hotpepper genre).
    pub genre_code: Option<String>,
    /// Display name of the genre, used by the fallback provider's prompt.
    pub genre_name: Option<String>,
    pub keyword: Option<String>,
}

impl SearchQuery {
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.prefecture.trim().is_empty() {
            return Err(CoreError::Validation("Prefecture is required".to_string()));
        }
        if self
            .keyword
            .as_deref()
            .is_some_and(|k| k.chars().count() > MAX_KEYWORD_LENGTH)
        {
            return Err(CoreError::Validation(format!(
                "Keyword exceeds maximum length of {MAX_KEYWORD_LENGTH} characters"
            )));
        }
        Ok(())
    }
}

/// Result from the primary, structured-data provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrimaryResult {
    /// Provider-assigned shop id.
    pub id: String,
    pub name: String,
    pub address: String,
    pub prefecture: Option<String>,
    pub city: Option<String>,
    pub hours: String,
    pub url: Option<String>,
    pub genre: Option<String>,
    pub catch_phrase: Option<String>,
    pub photo_url: Option<String>,
    pub coordinates: Option<Coordinates>,
    pub price_range: Option<PriceRange>,
}

/// Result from the LLM web-search fallback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FallbackResult {
    pub name: String,
    pub address: String,
    pub prefecture: Option<String>,
    pub city: Option<String>,
    pub hours: String,
    pub website: Option<String>,
    pub genre: Option<String>,
    pub sources: Vec<SourceCitation>,
}

/// A search candidate, tagged by the provider that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source")]
pub enum SearchResult {
    #[serde(rename = "hotpepper")]
    Primary(PrimaryResult),
    #[serde(rename = "ai")]
    Fallback(FallbackResult),
}

impl SearchResult {
    pub fn name(&self) -> &str {
        match self {
            SearchResult::Primary(r) => &r.name,
            SearchResult::Fallback(r) => &r.name,
        }
    }

    pub fn address(&self) -> &str {
        match self {
            SearchResult::Primary(r) => &r.address,
            SearchResult::Fallback(r) => &r.address,
        }
    }

    pub fn prefecture(&self) -> Option<&str> {
        match self {
            SearchResult::Primary(r) => r.prefecture.as_deref(),
            SearchResult::Fallback(r) => r.prefecture.as_deref(),
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, SearchResult::Fallback(_))
    }
}

/// Append fallback candidates, skipping any whose exact `(name, address)`
/// pair is already present. Matching is case-sensitive and whitespace is not
/// normalised.
pub fn merge_fallback(existing: &mut Vec<SearchResult>, fallback: Vec<SearchResult>) {
    for candidate in fallback {
        let duplicate = existing
            .iter()
            .any(|r| r.name() == candidate.name() && r.address() == candidate.address());
        if !duplicate {
            existing.push(candidate);
        }
    }
}

/// Keep only results whose prefecture equals the query's prefecture.
pub fn scope_to_prefecture(results: &[SearchResult], prefecture: &str) -> Vec<SearchResult> {
    if prefecture.is_empty() {
        return results.to_vec();
    }
    results
        .iter()
        .filter(|r| r.prefecture() == Some(prefecture))
        .cloned()
        .collect()
}
