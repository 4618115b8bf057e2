use std::time::Instant;

use mineruca_core::search::ProviderError;

/// Errors from the external gourmet service clients.
#[derive(Debug, thiserror::Error)]
pub enum GourmetError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The service returned a non-2xx status code.
    #[error("API error ({status}): {body}")]
    Api {
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The service answered 2xx but reported an error in the payload.
    #[error("Provider error: {0}")]
    Provider(String),

    /// The response could not be understood.
    #[error("Unexpected response: {0}")]
    Parse(String),

    /// The API key for this service is not configured.
    #[error("{0} is not configured")]
    NotConfigured(&'static str),
}

impl GourmetError {
    /// Convert into the search seam's error, tagged with the provider name.
    pub fn into_provider_error(self, provider: &'static str) -> ProviderError {
        ProviderError::new(provider, self.to_string())
    }
}

/// Send a request to `service`, logging status and latency, and reject
/// non-2xx answers.
pub(crate) async fn execute(
    service: &'static str,
    request: reqwest::RequestBuilder,
) -> Result<reqwest::Response, GourmetError> {
    let started = Instant::now();
    // Request URLs carry API keys; keep them out of errors and logs.
    let result = request.send().await.map_err(reqwest::Error::without_url);
    let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

    match &result {
        Ok(response) => tracing::debug!(
            service,
            status = response.status().as_u16(),
            elapsed_ms,
            "Upstream call finished"
        ),
        Err(e) => tracing::warn!(service, elapsed_ms, error = %e, "Upstream call failed"),
    }
    ensure_success(result?).await
}

/// Ensure the response has a success status code. Returns the response
/// unchanged on success, or [`GourmetError::Api`] with the body text.
async fn ensure_success(
    response: reqwest::Response,
) -> Result<reqwest::Response, GourmetError> {
    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        return Err(GourmetError::Api {
            status: status.as_u16(),
            body,
        });
    }
    Ok(response)
}
