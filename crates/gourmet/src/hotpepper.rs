//! Hotpepper Gourmet search API client (primary provider).
//!
//! `GET {base}/gourmet/v1/?key&format=json&keyword&middle_area&genre&count`.
//! The API has no prefecture parameter, so the prefecture goes into the
//! keyword and each result's prefecture is recovered from its address.

use std::sync::LazyLock;

use async_trait::async_trait;
use mineruca_core::prefecture::split_address;
use mineruca_core::restaurant::{Coordinates, PriceRange};
use mineruca_core::search::{
    PrimaryResult, ProviderError, RestaurantSearchProvider, SearchQuery, SearchResult,
};
use regex::Regex;
use serde::Deserialize;

use crate::config::GourmetConfig;
use crate::error::{execute, GourmetError};

pub const PROVIDER_NAME: &str = "hotpepper";

/// Maximum page size the API accepts.
const MAX_COUNT: u32 = 100;

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct Envelope {
    results: Results,
}

#[derive(Debug, Deserialize)]
struct Results {
    #[serde(default)]
    shop: Option<Vec<Shop>>,
    #[serde(default)]
    error: Option<Vec<ApiErrorEntry>>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorEntry {
    #[serde(default)]
    code: serde_json::Value,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct Shop {
    id: String,
    name: String,
    #[serde(default)]
    address: String,
    /// Number or numeric string depending on API version.
    #[serde(default)]
    lat: serde_json::Value,
    #[serde(default)]
    lng: serde_json::Value,
    #[serde(default)]
    open: String,
    #[serde(default)]
    catch: String,
    #[serde(default)]
    genre: Option<Named>,
    #[serde(default)]
    budget: Option<Named>,
    #[serde(default)]
    urls: Option<Urls>,
    #[serde(default)]
    photo: Option<Photo>,
}

#[derive(Debug, Deserialize)]
struct Named {
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct Urls {
    #[serde(default)]
    pc: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Photo {
    #[serde(default)]
    pc: Option<PhotoSizes>,
}

#[derive(Debug, Deserialize)]
struct PhotoSizes {
    #[serde(default)]
    l: Option<String>,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

pub struct HotpepperClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl HotpepperClient {
    pub fn new(client: reqwest::Client, config: &GourmetConfig) -> Self {
        Self {
            client,
            base_url: config.hotpepper_base_url.clone(),
            api_key: config.hotpepper_api_key.clone(),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Run a structured search and convert the shops into search results.
    pub async fn search_shops(
        &self,
        query: &SearchQuery,
    ) -> Result<Vec<SearchResult>, GourmetError> {
        let key = self
            .api_key
            .as_deref()
            .ok_or(GourmetError::NotConfigured("Hotpepper API"))?;

        let keyword = build_keyword(query);
        let count = MAX_COUNT.to_string();
        let mut params: Vec<(&str, &str)> = vec![
            ("key", key),
            ("format", "json"),
            ("keyword", keyword.as_str()),
            ("count", count.as_str()),
        ];
        if let Some(area) = non_blank(&query.area_code) {
            params.push(("middle_area", area));
        }
        if let Some(genre) = non_blank(&query.genre_code) {
            params.push(("genre", genre));
        }

        let request = self
            .client
            .get(format!("{}/gourmet/v1/", self.base_url))
            .query(&params);
        let body: serde_json::Value = execute("hotpepper", request).await?.json().await?;
        parse_response(body)
    }
}

#[async_trait]
impl RestaurantSearchProvider for HotpepperClient {
    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<SearchResult>, ProviderError> {
        self.search_shops(query)
            .await
            .map_err(|e| e.into_provider_error(PROVIDER_NAME))
    }
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn build_keyword(query: &SearchQuery) -> String {
    match non_blank(&query.keyword) {
        Some(keyword) => format!("{} {}", query.prefecture.trim(), keyword),
        None => query.prefecture.trim().to_string(),
    }
}

fn parse_response(body: serde_json::Value) -> Result<Vec<SearchResult>, GourmetError> {
    let envelope: Envelope =
        serde_json::from_value(body).map_err(|e| GourmetError::Parse(e.to_string()))?;

    if let Some(errors) = envelope.results.error.filter(|e| !e.is_empty()) {
        let message = errors
            .iter()
            .map(|e| format!("{} ({})", e.message, e.code))
            .collect::<Vec<_>>()
            .join("; ");
        return Err(GourmetError::Provider(message));
    }

    Ok(envelope
        .results
        .shop
        .unwrap_or_default()
        .into_iter()
        .map(shop_to_result)
        .collect())
}

fn shop_to_result(shop: Shop) -> SearchResult {
    let (prefecture, city) = split_address(&shop.address);
    let coordinates = Coordinates::from_parts(loose_f64(&shop.lat), loose_f64(&shop.lng));
    let price_range = shop.budget.as_ref().and_then(|b| parse_budget(&b.name));

    SearchResult::Primary(PrimaryResult {
        id: shop.id,
        name: shop.name,
        address: shop.address,
        prefecture,
        city,
        hours: shop.open,
        url: shop.urls.and_then(|u| u.pc),
        genre: shop.genre.map(|g| g.name).filter(|g| !g.is_empty()),
        catch_phrase: Some(shop.catch).filter(|c| !c.is_empty()),
        photo_url: shop.photo.and_then(|p| p.pc).and_then(|p| p.l),
        coordinates,
        price_range,
    })
}

fn loose_f64(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

static BUDGET_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([\d,]+)?\s*円?\s*([～〜~])?\s*([\d,]+)?\s*円?").expect("valid regex")
});

/// Parse a budget label such as `2001～3000円`, `～500円` or `30001円～`.
pub fn parse_budget(label: &str) -> Option<PriceRange> {
    let caps = BUDGET_RE.captures(label)?;
    let number = |i: usize| {
        caps.get(i)
            .and_then(|m| m.as_str().replace(',', "").parse::<i32>().ok())
    };
    let first = number(1);
    let second = number(3);
    let range = if caps.get(2).is_some() {
        PriceRange::from_parts(first, second)
    } else {
        // A single amount with no separator.
        PriceRange::from_parts(first, first)
    }?;
    range.validate().ok()?;
    Some(range)
}
