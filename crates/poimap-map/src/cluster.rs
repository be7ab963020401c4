//! Greedy fixed-radius clustering in screen space.
//!
//! Points are visited in input order. Each joins the first existing cluster
//! whose centroid lies within the radius, which then moves to the mean of its
//! members; otherwise it seeds a new cluster. The number of clusters is
//! stable for well-separated groups, but centroids (and borderline
//! memberships) depend on visiting order. That is inherent to the greedy
//! pass.
//!
//! Clusters are rebuilt from scratch on every call; nothing is cached between
//! viewport changes.

use poimap_core::{Cluster, EnrichedPoi, GeoPoint, ViewportBounds, MAX_CLUSTER_ZOOM};
use serde::Serialize;

use crate::projector::{PixelPoint, ViewportProjector};

pub const CLUSTER_RADIUS_PX: f64 = 60.0;

/// Command sent to the external map widget.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum MapCommand {
    Recenter { center: GeoPoint, zoom: u8 },
}

/// Zoom levels gained per cluster click.
const CLUSTER_CLICK_ZOOM_STEP: u8 = 2;

/// Deepest zoom a cluster click asks for: the first level without clustering,
/// so a click at any clustering zoom always splits the cluster.
const MAX_CLICK_ZOOM: u8 = MAX_CLUSTER_ZOOM + 1;

struct PendingCluster {
    sum_x: f64,
    sum_y: f64,
    centroid: PixelPoint,
    member_ids: Vec<String>,
}

impl PendingCluster {
    fn seed(id: &str, at: PixelPoint) -> Self {
        Self {
            sum_x: at.x,
            sum_y: at.y,
            centroid: at,
            member_ids: vec![id.to_owned()],
        }
    }

    fn push(&mut self, id: &str, at: PixelPoint) {
        self.member_ids.push(id.to_owned());
        self.sum_x += at.x;
        self.sum_y += at.y;
        #[allow(clippy::cast_precision_loss)]
        let n = self.member_ids.len() as f64;
        self.centroid = PixelPoint {
            x: self.sum_x / n,
            y: self.sum_y / n,
        };
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ClusterEngine {
    radius_px: f64,
}

impl Default for ClusterEngine {
    fn default() -> Self {
        Self {
            radius_px: CLUSTER_RADIUS_PX,
        }
    }
}

impl ClusterEngine {
    /// Group `points` for the viewport `bounds`.
    ///
    /// Returns an empty list until the viewport is known. Above
    /// [`MAX_CLUSTER_ZOOM`] every point is its own single marker.
    #[must_use]
    pub fn cluster(
        &self,
        points: &[EnrichedPoi],
        bounds: Option<&ViewportBounds>,
    ) -> Vec<Cluster> {
        let Some(bounds) = bounds else {
            return Vec::new();
        };
        if points.is_empty() {
            return Vec::new();
        }
        if bounds.zoom > MAX_CLUSTER_ZOOM {
            return points
                .iter()
                .map(|p| Cluster::singleton(p.id.clone(), p.coordinates))
                .collect();
        }

        let projector = ViewportProjector::new(bounds);
        let mut pending: Vec<PendingCluster> = Vec::new();

        for poi in points {
            let at = projector.project(poi.coordinates);
            match pending
                .iter_mut()
                .find(|c| c.centroid.distance(&at) <= self.radius_px)
            {
                Some(cluster) => cluster.push(&poi.id, at),
                None => pending.push(PendingCluster::seed(&poi.id, at)),
            }
        }

        tracing::debug!(
            points = points.len(),
            clusters = pending.len(),
            zoom = bounds.zoom,
            "reclustered"
        );

        pending
            .into_iter()
            .map(|c| {
                let count = c.member_ids.len();
                Cluster {
                    centroid: projector.unproject(c.centroid),
                    member_ids: c.member_ids,
                    count,
                }
            })
            .collect()
    }
}

/// Command that recenters the map on `cluster` and zooms in so it can split.
#[must_use]
pub fn zoom_into(cluster: &Cluster, bounds: &ViewportBounds) -> MapCommand {
    MapCommand::Recenter {
        center: cluster.centroid,
        zoom: bounds
            .zoom
            .saturating_add(CLUSTER_CLICK_ZOOM_STEP)
            .min(MAX_CLICK_ZOOM),
    }
}

#[cfg(test)]
#[path = "cluster_test.rs"]
mod tests;
