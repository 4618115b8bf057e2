//! Search provider seam.

use async_trait::async_trait;

use super::{SearchQuery, SearchResult};

/// A provider call failed (network, HTTP status, or an error payload).
#[derive(Debug, Clone, thiserror::Error)]
#[error("{provider} search failed: {message}")]
pub struct ProviderError {
    pub provider: &'static str,
    pub message: String,
}

impl ProviderError {
    pub fn new(provider: &'static str, message: impl Into<String>) -> Self {
        Self {
            provider,
            message: message.into(),
        }
    }
}

/// A source of restaurant candidates for a structured query.
#[async_trait]
pub trait RestaurantSearchProvider: Send + Sync {
    /// Short provider name used in logs and errors.
    fn name(&self) -> &'static str;

    async fn search(&self, query: &SearchQuery) -> Result<Vec<SearchResult>, ProviderError>;
}
