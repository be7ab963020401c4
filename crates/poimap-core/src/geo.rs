//! Geographic value types shared by discovery and map layers.

use serde::{Deserialize, Serialize};

/// Highest zoom level at which points are still grouped into clusters.
pub const MAX_CLUSTER_ZOOM: u8 = 16;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    #[must_use]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// `true` when both components are finite and within WGS84 range.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.6},{:.6}", self.lat, self.lng)
    }
}

/// The geographic rectangle currently visible on the map, plus zoom level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportBounds {
    pub northeast: GeoPoint,
    pub southwest: GeoPoint,
    pub zoom: u8,
}

impl ViewportBounds {
    #[must_use]
    pub fn northwest(&self) -> GeoPoint {
        GeoPoint::new(self.northeast.lat, self.southwest.lng)
    }

    #[must_use]
    pub fn southeast(&self) -> GeoPoint {
        GeoPoint::new(self.southwest.lat, self.northeast.lng)
    }

    #[must_use]
    pub fn center(&self) -> GeoPoint {
        GeoPoint::new(
            (self.northeast.lat + self.southwest.lat) / 2.0,
            (self.northeast.lng + self.southwest.lng) / 2.0,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerKind {
    UserPosition,
    Single,
    Cluster,
}

/// A group of POIs whose screen projections fall within the cluster radius.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cluster {
    pub centroid: GeoPoint,
    pub member_ids: Vec<String>,
    pub count: usize,
}

impl Cluster {
    #[must_use]
    pub fn singleton(id: String, at: GeoPoint) -> Self {
        Self {
            centroid: at,
            member_ids: vec![id],
            count: 1,
        }
    }

    /// Singles render as a plain POI marker; anything larger is a cluster marker.
    #[must_use]
    pub fn marker_kind(&self) -> MarkerKind {
        if self.count == 1 {
            MarkerKind::Single
        } else {
            MarkerKind::Cluster
        }
    }
}
