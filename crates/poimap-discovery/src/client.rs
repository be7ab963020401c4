//! HTTP client for the geo search service, plus the request plumbing shared
//! with [`crate::EnrichmentClient`].

use std::time::Duration;

use poimap_core::{AppConfig, GeoPoint, RawCandidate, SearchRadius};
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;

use crate::error::DiscoveryError;
use crate::retry::retry_with_backoff;
use crate::source::CandidateSource;

/// Transport settings shared by both service clients.
#[derive(Debug, Clone)]
pub struct HttpSettings {
    pub timeout_secs: u64,
    pub user_agent: String,
    /// Additional attempts after the first failure for transient errors.
    pub max_retries: u32,
    pub backoff_base_ms: u64,
}

impl HttpSettings {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            timeout_secs: config.request_timeout_secs,
            user_agent: config.user_agent.clone(),
            max_retries: config.max_retries,
            backoff_base_ms: config.retry_backoff_base_ms,
        }
    }
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 15,
            user_agent: "poimap/0.1 (poi-discovery)".to_owned(),
            max_retries: 2,
            backoff_base_ms: 250,
        }
    }
}

pub(crate) fn build_http_client(settings: &HttpSettings) -> Result<Client, DiscoveryError> {
    Ok(Client::builder()
        .timeout(Duration::from_secs(settings.timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .user_agent(settings.user_agent.as_str())
        .build()?)
}

/// Parse `base_url`, ensuring it ends with exactly one slash so relative
/// joins append to the path instead of replacing its last segment.
pub(crate) fn normalise_base_url(base_url: &str) -> Result<Url, DiscoveryError> {
    let normalised = format!("{}/", base_url.trim().trim_end_matches('/'));
    let url = Url::parse(&normalised).map_err(|e| DiscoveryError::InvalidBaseUrl {
        url: base_url.to_owned(),
        reason: e.to_string(),
    })?;
    if url.cannot_be_a_base() {
        return Err(DiscoveryError::InvalidBaseUrl {
            url: base_url.to_owned(),
            reason: "URL cannot be used as a base".to_owned(),
        });
    }
    Ok(url)
}

/// Sends a GET request, requires a 2xx status, and decodes the JSON body.
pub(crate) async fn get_json<T: DeserializeOwned>(
    client: &Client,
    url: &Url,
    context: &str,
) -> Result<T, DiscoveryError> {
    let response = client.get(url.clone()).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(DiscoveryError::UnexpectedStatus {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| DiscoveryError::Deserialize {
        context: context.to_owned(),
        source: e,
    })
}

/// Client for the geo search service.
///
/// Use [`GeoSearchClient::from_config`] in production or
/// [`GeoSearchClient::with_base_url`] to point at a mock server in tests.
pub struct GeoSearchClient {
    client: Client,
    base_url: Url,
    settings: HttpSettings,
}

impl GeoSearchClient {
    /// # Errors
    ///
    /// Returns [`DiscoveryError::InvalidBaseUrl`] for a malformed search URL,
    /// or [`DiscoveryError::Http`] if the HTTP client cannot be built.
    pub fn from_config(config: &AppConfig) -> Result<Self, DiscoveryError> {
        Self::with_base_url(&config.search_base_url, HttpSettings::from_config(config))
    }

    /// # Errors
    ///
    /// Returns [`DiscoveryError::InvalidBaseUrl`] if `base_url` does not parse,
    /// or [`DiscoveryError::Http`] if the HTTP client cannot be built.
    pub fn with_base_url(base_url: &str, settings: HttpSettings) -> Result<Self, DiscoveryError> {
        Ok(Self {
            client: build_http_client(&settings)?,
            base_url: normalise_base_url(base_url)?,
            settings,
        })
    }

    /// Fetch raw candidates within `radius` of `center`.
    ///
    /// # Errors
    ///
    /// - [`DiscoveryError::Http`] on network failure after retries.
    /// - [`DiscoveryError::UnexpectedStatus`] for any non-2xx status.
    /// - [`DiscoveryError::Deserialize`] if the body is not a candidate array.
    pub async fn nearby(
        &self,
        center: GeoPoint,
        radius: SearchRadius,
    ) -> Result<Vec<RawCandidate>, DiscoveryError> {
        let url = self.nearby_url(center, radius)?;
        tracing::debug!(%url, "querying geo search");
        retry_with_backoff(self.settings.max_retries, self.settings.backoff_base_ms, || {
            get_json::<Vec<RawCandidate>>(&self.client, &url, "nearby search")
        })
        .await
    }

    fn nearby_url(&self, center: GeoPoint, radius: SearchRadius) -> Result<Url, DiscoveryError> {
        let mut url = self
            .base_url
            .join("pois/nearby")
            .map_err(|e| DiscoveryError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: e.to_string(),
            })?;
        url.query_pairs_mut()
            .append_pair("lat", &center.lat.to_string())
            .append_pair("lng", &center.lng.to_string())
            .append_pair("radius", &radius.meters().to_string());
        Ok(url)
    }
}

impl CandidateSource for GeoSearchClient {
    async fn search(
        &self,
        center: GeoPoint,
        radius: SearchRadius,
    ) -> Result<Vec<RawCandidate>, DiscoveryError> {
        self.nearby(center, radius).await
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
