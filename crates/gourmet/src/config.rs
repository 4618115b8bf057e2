use std::time::Duration;

use crate::error::GourmetError;

const DEFAULT_HOTPEPPER_BASE_URL: &str = "https://webservice.recruit.co.jp/hotpepper";
const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";
const DEFAULT_GEOCODING_BASE_URL: &str = "https://maps.googleapis.com";
const DEFAULT_PROVIDER_TIMEOUT_SECS: u64 = 30;

/// Credentials and endpoints for the external services.
///
/// A missing API key disables the corresponding client: its calls fail with
/// [`GourmetError::NotConfigured`] instead of reaching the network.
#[derive(Debug, Clone)]
pub struct GourmetConfig {
    pub hotpepper_api_key: Option<String>,
    pub hotpepper_base_url: String,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub google_maps_api_key: Option<String>,
    pub geocoding_base_url: String,
    pub provider_timeout_secs: u64,
}

impl GourmetConfig {
    /// Load configuration from environment variables.
    ///
    /// | Env Var                 | Default                                      |
    /// |-------------------------|----------------------------------------------|
    /// | `HOTPEPPER_API_KEY`     | unset (primary search disabled)              |
    /// | `HOTPEPPER_BASE_URL`    | `https://webservice.recruit.co.jp/hotpepper` |
    /// | `GEMINI_API_KEY`        | unset (fallback search and chat disabled)    |
    /// | `GEMINI_MODEL`          | `gemini-2.0-flash`                           |
    /// | `GEMINI_BASE_URL`       | `https://generativelanguage.googleapis.com`  |
    /// | `GOOGLE_MAPS_API_KEY`   | unset (geocoding disabled)                   |
    /// | `GEOCODING_BASE_URL`    | `https://maps.googleapis.com`                |
    /// | `PROVIDER_TIMEOUT_SECS` | `30`                                         |
    pub fn from_env() -> Self {
        let provider_timeout_secs: u64 = std::env::var("PROVIDER_TIMEOUT_SECS")
            .unwrap_or_else(|_| DEFAULT_PROVIDER_TIMEOUT_SECS.to_string())
            .parse()
            .expect("PROVIDER_TIMEOUT_SECS must be a valid u64");

        Self {
            hotpepper_api_key: non_empty_var("HOTPEPPER_API_KEY"),
            hotpepper_base_url: var_or("HOTPEPPER_BASE_URL", DEFAULT_HOTPEPPER_BASE_URL),
            gemini_api_key: non_empty_var("GEMINI_API_KEY"),
            gemini_model: var_or("GEMINI_MODEL", DEFAULT_GEMINI_MODEL),
            gemini_base_url: var_or("GEMINI_BASE_URL", DEFAULT_GEMINI_BASE_URL),
            google_maps_api_key: non_empty_var("GOOGLE_MAPS_API_KEY"),
            geocoding_base_url: var_or("GEOCODING_BASE_URL", DEFAULT_GEOCODING_BASE_URL),
            provider_timeout_secs,
        }
    }

    /// Shared HTTP client with the configured per-request timeout.
    pub fn http_client(&self) -> Result<reqwest::Client, GourmetError> {
        Ok(reqwest::Client::builder()
            .timeout(Duration::from_secs(self.provider_timeout_secs))
            .build()?)
    }
}

impl Default for GourmetConfig {
    /// All services disabled, default endpoints.
    fn default() -> Self {
        Self {
            hotpepper_api_key: None,
            hotpepper_base_url: DEFAULT_HOTPEPPER_BASE_URL.to_string(),
            gemini_api_key: None,
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            gemini_base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            google_maps_api_key: None,
            geocoding_base_url: DEFAULT_GEOCODING_BASE_URL.to_string(),
            provider_timeout_secs: DEFAULT_PROVIDER_TIMEOUT_SECS,
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn var_or(name: &str, default: &str) -> String {
    non_empty_var(name)
        .unwrap_or_else(|| default.to_string())
        .trim_end_matches('/')
        .to_string()
}
