//! HTTP client for the enrichment service.

use poimap_core::{AppConfig, GeometryRef};
use reqwest::{Client, Url};
use serde::Deserialize;

use crate::client::{build_http_client, get_json, normalise_base_url, HttpSettings};
use crate::error::DiscoveryError;
use crate::retry::retry_with_backoff;
use crate::source::PoiEnricher;

/// Descriptive and media data for one candidate.
#[derive(Debug, Clone, Deserialize)]
pub struct EnrichmentRecord {
    pub content: ContentRecord,
    /// Absent media means no image and no geometry override.
    #[serde(default)]
    pub media: Option<MediaRecord>,
}

impl EnrichmentRecord {
    #[must_use]
    pub fn geometry(&self) -> Option<&GeometryRef> {
        self.media.as_ref().and_then(|m| m.geometry.as_ref())
    }

    #[must_use]
    pub fn image(&self) -> Option<&str> {
        self.media
            .as_ref()
            .and_then(|m| m.image.as_deref())
            .filter(|s| !s.trim().is_empty())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContentRecord {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MediaRecord {
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub geometry: Option<GeometryRef>,
}

/// Client for the enrichment service.
///
/// Every lookup is keyed by `{id}_{locale}`.
pub struct EnrichmentClient {
    client: Client,
    base_url: Url,
    locale: String,
    settings: HttpSettings,
}

impl EnrichmentClient {
    /// # Errors
    ///
    /// Returns [`DiscoveryError::InvalidBaseUrl`] for a malformed enrichment
    /// URL, or [`DiscoveryError::Http`] if the HTTP client cannot be built.
    pub fn from_config(config: &AppConfig) -> Result<Self, DiscoveryError> {
        Self::with_base_url(
            &config.enrichment_base_url,
            &config.locale,
            HttpSettings::from_config(config),
        )
    }

    /// # Errors
    ///
    /// Returns [`DiscoveryError::InvalidBaseUrl`] if `base_url` does not parse,
    /// or [`DiscoveryError::Http`] if the HTTP client cannot be built.
    pub fn with_base_url(
        base_url: &str,
        locale: &str,
        settings: HttpSettings,
    ) -> Result<Self, DiscoveryError> {
        Ok(Self {
            client: build_http_client(&settings)?,
            base_url: normalise_base_url(base_url)?,
            locale: locale.to_owned(),
            settings,
        })
    }

    /// Fetch the enrichment record for one candidate id.
    ///
    /// # Errors
    ///
    /// - [`DiscoveryError::MissingId`] for a blank id.
    /// - [`DiscoveryError::Http`] / [`DiscoveryError::UnexpectedStatus`] on transport failure.
    /// - [`DiscoveryError::Deserialize`] if the record lacks the expected shape.
    pub async fn fetch(&self, id: &str) -> Result<EnrichmentRecord, DiscoveryError> {
        let url = self.record_url(id)?;
        let context = format!("enrichment(id={id})");
        retry_with_backoff(self.settings.max_retries, self.settings.backoff_base_ms, || {
            get_json::<EnrichmentRecord>(&self.client, &url, &context)
        })
        .await
    }

    fn record_url(&self, id: &str) -> Result<Url, DiscoveryError> {
        let id = id.trim();
        if id.is_empty() {
            return Err(DiscoveryError::MissingId);
        }
        let key = if self.locale.is_empty() {
            id.to_owned()
        } else {
            format!("{id}_{}", self.locale)
        };
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| DiscoveryError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: "URL cannot be used as a base".to_owned(),
            })?
            .pop_if_empty()
            .push("pois")
            .push(&key);
        Ok(url)
    }
}

impl PoiEnricher for EnrichmentClient {
    async fn enrich(&self, id: &str) -> Result<EnrichmentRecord, DiscoveryError> {
        self.fetch(id).await
    }
}
