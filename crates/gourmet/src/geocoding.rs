//! Google Geocoding API client.

use mineruca_core::restaurant::Coordinates;
use serde::Deserialize;

use crate::config::GourmetConfig;
use crate::error::{execute, GourmetError};

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
    #[serde(default)]
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: Location,
}

#[derive(Debug, Deserialize)]
struct Location {
    lat: f64,
    lng: f64,
}

pub struct GoogleGeocoder {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl GoogleGeocoder {
    pub fn new(client: reqwest::Client, config: &GourmetConfig) -> Self {
        Self {
            client,
            base_url: config.geocoding_base_url.clone(),
            api_key: config.google_maps_api_key.clone(),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Resolve an address to coordinates. `Ok(None)` means the service
    /// found no match.
    pub async fn geocode(&self, address: &str) -> Result<Option<Coordinates>, GourmetError> {
        let key = self
            .api_key
            .as_deref()
            .ok_or(GourmetError::NotConfigured("Geocoding API"))?;
        let address = address.trim();
        if address.is_empty() {
            return Ok(None);
        }

        let request = self
            .client
            .get(format!("{}/maps/api/geocode/json", self.base_url))
            .query(&[("address", address), ("key", key), ("language", "ja")]);
        let body: GeocodeResponse = execute("geocoding", request).await?.json().await?;
        interpret(body)
    }
}

fn interpret(body: GeocodeResponse) -> Result<Option<Coordinates>, GourmetError> {
    match body.status.as_str() {
        "OK" => Ok(body
            .results
            .first()
            .and_then(|r| {
                Coordinates::from_parts(Some(r.geometry.location.lat), Some(r.geometry.location.lng))
            })),
        "ZERO_RESULTS" => Ok(None),
        other => Err(GourmetError::Provider(match body.error_message {
            Some(message) => format!("{other}: {message}"),
            None => other.to_string(),
        })),
    }
}
