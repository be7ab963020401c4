//! Nearby POI discovery: geo search, enrichment, and visitor location.

pub mod client;
pub mod enrichment;
pub mod error;
pub mod geometry;
pub mod location;
pub mod pipeline;
pub(crate) mod retry;
pub mod source;

pub use client::{GeoSearchClient, HttpSettings};
pub use enrichment::{ContentRecord, EnrichmentClient, EnrichmentRecord, MediaRecord};
pub use error::DiscoveryError;
pub use geometry::parse_geometry;
pub use location::{
    LocationProvider, LocationSource, ManualPlace, PositionError, PositionOptions, Resolution,
};
pub use pipeline::{DiscoveryOutcome, DiscoveryPipeline, DiscoveryStats};
pub use source::{CandidateSource, PoiEnricher};

/// Pipeline wired to the HTTP service clients.
pub type HttpDiscoveryPipeline = DiscoveryPipeline<GeoSearchClient, EnrichmentClient>;

/// Build an [`HttpDiscoveryPipeline`] from application configuration.
///
/// # Errors
///
/// Returns [`DiscoveryError`] if either service URL is invalid or the HTTP
/// client cannot be constructed.
pub fn http_pipeline(
    config: &poimap_core::AppConfig,
) -> Result<HttpDiscoveryPipeline, DiscoveryError> {
    Ok(DiscoveryPipeline::new(
        GeoSearchClient::from_config(config)?,
        EnrichmentClient::from_config(config)?,
        config.max_concurrent_enrichments,
    ))
}
