//! HTTP client for provider feed endpoints.

use std::time::Duration;

use fuelwatch_core::{AppConfig, ProviderSpec, RawFetchResult};
use reqwest::Client;

use crate::error::FetchError;

/// Thin wrapper over `reqwest::Client` configured for provider feeds:
/// one timeout for the whole request, a browser-like `User-Agent`, and
/// `Accept: application/json` on every call.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct FeedClient {
    client: Client,
    timeout_ms: u64,
}

impl FeedClient {
    /// # Errors
    ///
    /// Returns [`FetchError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed (e.g., invalid TLS config).
    pub fn new(timeout_ms: u64, user_agent: &str) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .user_agent(user_agent)
            .build()?;
        Ok(Self { client, timeout_ms })
    }

    /// # Errors
    ///
    /// See [`FeedClient::new`].
    pub fn from_config(config: &AppConfig) -> Result<Self, FetchError> {
        Self::new(config.fetch_timeout_ms, &config.user_agent)
    }

    #[must_use]
    pub fn timeout_ms(&self) -> u64 {
        self.timeout_ms
    }

    /// Fetches one provider's feed and tags it with the provider's brand label.
    ///
    /// # Errors
    ///
    /// Propagates any error from [`FeedClient::get_json`].
    pub async fn fetch_provider(
        &self,
        provider: &ProviderSpec,
    ) -> Result<RawFetchResult, FetchError> {
        let payload = self.get_json(&provider.endpoint, None).await?;
        Ok(RawFetchResult {
            brand_label: provider.brand_label.clone(),
            payload,
        })
    }

    /// Issues a single GET and parses the body as JSON. No retries.
    ///
    /// The response `Content-Type` is not checked; some feeds serve JSON as
    /// `text/plain` or `application/octet-stream`.
    ///
    /// # Errors
    ///
    /// - [`FetchError::Timeout`] if the request exceeds the configured timeout.
    /// - [`FetchError::UnexpectedStatus`] for any non-2xx status.
    /// - [`FetchError::Http`] for connection or TLS failures.
    /// - [`FetchError::Deserialize`] if the body is not valid JSON.
    pub async fn get_json(
        &self,
        url: &str,
        referer: Option<&str>,
    ) -> Result<serde_json::Value, FetchError> {
        let mut request = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json");

        if let Some(referer) = referer {
            request = request.header(reqwest::header::REFERER, referer);
        }

        let response = request.send().await.map_err(|e| self.classify(url, e))?;
        let status = response.status();

        if !status.is_success() {
            return Err(FetchError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_owned(),
            });
        }

        let body = response.bytes().await.map_err(|e| self.classify(url, e))?;
        serde_json::from_slice(&body).map_err(|e| FetchError::Deserialize {
            context: format!("feed body from {url}"),
            source: e,
        })
    }

    fn classify(&self, url: &str, error: reqwest::Error) -> FetchError {
        if error.is_timeout() {
            FetchError::Timeout {
                url: url.to_owned(),
                timeout_ms: self.timeout_ms,
            }
        } else {
            FetchError::Http(error)
        }
    }
}
