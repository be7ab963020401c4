//! The orchestrating layer.
//!
//! `DiscoverySession` owns every piece of shared mutable state (center,
//! radius, POI set, viewport, marker flags, last advisory) and mutates it
//! only through the component contracts. All transitions happen on the
//! caller's single event timeline; the only parallel phase is the
//! enrichment fan-out inside the pipeline.

use std::time::Duration;

use poimap_core::{
    Advisory, Cluster, EnrichedPoi, GeoPoint, RadiusChange, RadiusController, SearchRadius,
    ViewportBounds,
};
use poimap_discovery::{
    CandidateSource, DiscoveryPipeline, DiscoveryStats, LocationProvider, LocationSource,
    ManualPlace, PoiEnricher, Resolution,
};
use poimap_map::{zoom_into, ClusterEngine, MapCommand, MarkerStateStore};

/// Starting state for a session.
#[derive(Debug, Clone, Copy)]
pub struct SessionDefaults {
    pub center: GeoPoint,
    pub radius: SearchRadius,
    pub animation_window: Duration,
}

impl SessionDefaults {
    #[must_use]
    pub fn from_config(config: &poimap_core::AppConfig) -> Self {
        Self {
            center: config.default_center,
            radius: config.default_radius,
            animation_window: config.animation_window(),
        }
    }
}

pub struct DiscoverySession<S, E, L> {
    pipeline: DiscoveryPipeline<S, E>,
    location: LocationProvider<L>,
    radius: RadiusController,
    engine: ClusterEngine,
    markers: MarkerStateStore,
    center: GeoPoint,
    place_label: Option<String>,
    pois: Vec<EnrichedPoi>,
    viewport: Option<ViewportBounds>,
    clusters: Vec<Cluster>,
    advisory: Option<Advisory>,
    last_stats: Option<DiscoveryStats>,
}

impl<S, E, L> DiscoverySession<S, E, L>
where
    S: CandidateSource,
    E: PoiEnricher,
    L: LocationSource,
{
    pub fn new(
        pipeline: DiscoveryPipeline<S, E>,
        location: LocationProvider<L>,
        defaults: SessionDefaults,
    ) -> Self {
        Self {
            pipeline,
            location,
            radius: RadiusController::new(defaults.radius, defaults.center),
            engine: ClusterEngine::default(),
            markers: MarkerStateStore::new(defaults.animation_window),
            center: defaults.center,
            place_label: None,
            pois: Vec::new(),
            viewport: None,
            clusters: Vec::new(),
            advisory: None,
            last_stats: None,
        }
    }

    /// Resolve the visitor's device position and, on success, run a discovery cycle.
    ///
    /// On failure the advisory is recorded and the session waits for a
    /// manual place. A call while a request is outstanding does nothing.
    pub async fn locate(&mut self) -> Resolution {
        let resolution = self.location.resolve().await;
        self.apply_resolution(resolution).await;
        resolution
    }

    /// Explicit user retry of device location.
    pub async fn retry_location(&mut self) -> Resolution {
        let resolution = self.location.retry().await;
        self.apply_resolution(resolution).await;
        resolution
    }

    async fn apply_resolution(&mut self, resolution: Resolution) {
        match resolution {
            Resolution::Resolved(point) => {
                self.center = point;
                self.place_label = None;
                self.markers.show_user_position();
                self.run_cycle().await;
            }
            Resolution::Failed(failure) => {
                self.advisory = Some(Advisory::from(failure));
            }
            Resolution::Skipped => {}
        }
    }

    /// Treat a manually selected place exactly like a resolved position.
    pub async fn select_place(&mut self, place: ManualPlace) {
        tracing::info!(point = %place.point, label = ?place.label, "place selected");
        self.center = place.point;
        self.place_label = place.label;
        self.run_cycle().await;
    }

    /// Clamp and apply a new radius, re-searching when the controller asks for it.
    pub async fn set_radius(&mut self, meters: i64) -> RadiusChange {
        let change = self.radius.set_radius(meters, self.center, self.pois.len());
        if let RadiusChange::Changed {
            radius,
            trigger_search,
        } = change
        {
            tracing::debug!(radius = radius.meters(), trigger_search, "radius changed");
            if trigger_search {
                self.run_cycle().await;
            }
        }
        change
    }

    /// Apply the quick-select radius at `index`; out-of-range indexes are ignored.
    pub async fn quick_select_radius(&mut self, index: usize) -> Option<RadiusChange> {
        let change = self
            .radius
            .quick_select(index, self.center, self.pois.len())?;
        if let RadiusChange::Changed {
            trigger_search: true,
            ..
        } = change
        {
            self.run_cycle().await;
        }
        Some(change)
    }

    /// Record new viewport bounds from the map widget and recluster.
    ///
    /// Safe to call on every intermediate pan/zoom frame.
    pub fn update_viewport(&mut self, bounds: ViewportBounds) -> &[Cluster] {
        self.viewport = Some(bounds);
        self.recluster();
        &self.clusters
    }

    pub fn toggle_marker(&mut self, id: &str) -> bool {
        self.markers.toggle_open(id)
    }

    /// Zoom command for a cluster marker click. Single markers yield `None`;
    /// they open via [`Self::toggle_marker`].
    #[must_use]
    pub fn click_cluster(&self, index: usize) -> Option<MapCommand> {
        let cluster = self.clusters.get(index).filter(|c| c.count >= 2)?;
        let bounds = self.viewport.as_ref()?;
        Some(zoom_into(cluster, bounds))
    }

    #[must_use]
    pub fn center(&self) -> GeoPoint {
        self.center
    }

    #[must_use]
    pub fn place_label(&self) -> Option<&str> {
        self.place_label.as_deref()
    }

    #[must_use]
    pub fn radius(&self) -> SearchRadius {
        self.radius.radius()
    }

    #[must_use]
    pub fn pois(&self) -> &[EnrichedPoi] {
        &self.pois
    }

    #[must_use]
    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    #[must_use]
    pub fn markers(&self) -> &MarkerStateStore {
        &self.markers
    }

    #[must_use]
    pub fn advisory(&self) -> Option<&Advisory> {
        self.advisory.as_ref()
    }

    #[must_use]
    pub fn last_stats(&self) -> Option<DiscoveryStats> {
        self.last_stats
    }

    async fn run_cycle(&mut self) {
        let outcome = self
            .pipeline
            .discover(self.center, self.radius.radius())
            .await;
        self.advisory = outcome.advisory;
        self.last_stats = Some(outcome.stats);
        self.pois = outcome.pois;
        self.markers.replace(self.pois.iter().map(|p| p.id.clone()));
        self.recluster();
    }

    fn recluster(&mut self) {
        self.clusters = self.engine.cluster(&self.pois, self.viewport.as_ref());
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
