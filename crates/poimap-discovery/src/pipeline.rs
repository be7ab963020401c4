//! Discovery cycle orchestration.
//!
//! search → public filter → concurrent enrichment → validated POI set.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use poimap_core::{Advisory, EnrichedPoi, GeoPoint, RawCandidate, SearchRadius};

use crate::error::DiscoveryError;
use crate::geometry::parse_geometry;
use crate::source::{CandidateSource, PoiEnricher};

/// Counters for one discovery cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiscoveryStats {
    /// Raw candidates returned by the geo search.
    pub candidates: usize,
    /// Candidates that passed the public filter.
    pub public: usize,
    pub enriched: usize,
    /// Public candidates dropped for a missing id, duplicate id, failed
    /// enrichment, or unusable geometry.
    pub dropped: usize,
}

#[derive(Debug, Clone)]
pub struct DiscoveryOutcome {
    pub center: GeoPoint,
    pub radius: SearchRadius,
    /// Enriched POIs in search-response order.
    pub pois: Vec<EnrichedPoi>,
    pub stats: DiscoveryStats,
    /// Set only when the search itself failed.
    pub advisory: Option<Advisory>,
    pub completed_at: DateTime<Utc>,
}

impl DiscoveryOutcome {
    fn empty(center: GeoPoint, radius: SearchRadius, advisory: Option<Advisory>) -> Self {
        Self {
            center,
            radius,
            pois: Vec::new(),
            stats: DiscoveryStats::default(),
            advisory,
            completed_at: Utc::now(),
        }
    }
}

/// Runs discovery cycles against a candidate source and an enricher.
pub struct DiscoveryPipeline<S, E> {
    source: S,
    enricher: E,
    max_concurrent: usize,
}

impl<S, E> DiscoveryPipeline<S, E>
where
    S: CandidateSource,
    E: PoiEnricher,
{
    /// `max_concurrent` bounds in-flight enrichment calls; values below 1 are raised to 1.
    pub fn new(source: S, enricher: E, max_concurrent: usize) -> Self {
        Self {
            source,
            enricher,
            max_concurrent: max_concurrent.max(1),
        }
    }

    /// Run one discovery cycle.
    ///
    /// Never fails: a search failure yields an empty set with a
    /// [`Advisory::SearchFailed`], and each enrichment failure drops only its
    /// own item. Results are exposed only once every enrichment has settled.
    pub async fn discover(&self, center: GeoPoint, radius: SearchRadius) -> DiscoveryOutcome {
        let candidates = match self.source.search(center, radius).await {
            Ok(candidates) => candidates,
            Err(err) => {
                tracing::warn!(
                    %center,
                    radius = radius.meters(),
                    error = %err,
                    "geo search failed"
                );
                let advisory = Advisory::SearchFailed {
                    reason: err.to_string(),
                };
                return DiscoveryOutcome::empty(center, radius, Some(advisory));
            }
        };

        let mut stats = DiscoveryStats {
            candidates: candidates.len(),
            ..DiscoveryStats::default()
        };

        let public: Vec<RawCandidate> = candidates
            .into_iter()
            .filter(RawCandidate::is_public)
            .collect();
        stats.public = public.len();

        let mut seen = HashSet::new();
        let mut work = Vec::with_capacity(public.len());
        for candidate in public {
            match candidate.id.as_deref() {
                None => {
                    tracing::warn!(error = %DiscoveryError::MissingId, "dropping candidate");
                    stats.dropped += 1;
                }
                Some(id) if !seen.insert(id.to_owned()) => {
                    tracing::debug!(id, "skipping duplicate candidate id");
                    stats.dropped += 1;
                }
                Some(_) => work.push(candidate),
            }
        }

        // buffer_unordered drives every future to completion; each yields its own
        // Result so one failure cannot cancel its siblings.
        let mut settled: Vec<(usize, Result<EnrichedPoi, DiscoveryError>)> =
            stream::iter(work.iter().enumerate())
                .map(|(index, candidate)| async move {
                    (index, self.enrich_candidate(candidate).await)
                })
                .buffer_unordered(self.max_concurrent)
                .collect()
                .await;
        settled.sort_by_key(|(index, _)| *index);

        let mut pois = Vec::with_capacity(settled.len());
        for (index, result) in settled {
            match result {
                Ok(poi) => pois.push(poi),
                Err(err) => {
                    let id = work[index].id.as_deref().unwrap_or_default();
                    tracing::warn!(id, error = %err, "dropping candidate: enrichment failed");
                    stats.dropped += 1;
                }
            }
        }
        stats.enriched = pois.len();

        tracing::info!(
            %center,
            radius = radius.meters(),
            candidates = stats.candidates,
            public = stats.public,
            enriched = stats.enriched,
            dropped = stats.dropped,
            "discovery cycle complete"
        );

        DiscoveryOutcome {
            center,
            radius,
            pois,
            stats,
            advisory: None,
            completed_at: Utc::now(),
        }
    }

    async fn enrich_candidate(
        &self,
        candidate: &RawCandidate,
    ) -> Result<EnrichedPoi, DiscoveryError> {
        let id = candidate.id.as_deref().ok_or(DiscoveryError::MissingId)?;
        let record = self.enricher.enrich(id).await?;

        // Enrichment geometry wins over the search hit's coarse geometry.
        let coordinates = match (record.geometry(), candidate.geometry.as_ref()) {
            (Some(enriched), _) => parse_geometry(enriched)?,
            (None, Some(raw)) => parse_geometry(raw)?,
            (None, None) => {
                return Err(DiscoveryError::MissingGeometry { id: id.to_owned() });
            }
        };

        Ok(EnrichedPoi {
            id: id.to_owned(),
            title: record.content.title.trim().to_owned(),
            description: record
                .content
                .description
                .as_deref()
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(str::to_owned),
            image_ref: record.image().map(str::to_owned),
            coordinates,
        })
    }
}

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod tests;
