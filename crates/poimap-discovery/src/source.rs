//! Seams between the pipeline and the services it consumes.

use std::future::Future;

use poimap_core::{GeoPoint, RawCandidate, SearchRadius};

use crate::enrichment::EnrichmentRecord;
use crate::error::DiscoveryError;

/// Geo-indexed search for raw candidates near a coordinate.
pub trait CandidateSource {
    fn search(
        &self,
        center: GeoPoint,
        radius: SearchRadius,
    ) -> impl Future<Output = Result<Vec<RawCandidate>, DiscoveryError>> + Send;
}

/// Secondary lookup that attaches descriptive and geometry data to one candidate.
pub trait PoiEnricher {
    fn enrich(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<EnrichmentRecord, DiscoveryError>> + Send;
}
