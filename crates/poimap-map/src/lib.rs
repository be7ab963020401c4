//! Map-side state: projection, clustering, and marker interaction.

pub mod cluster;
pub mod marker;
pub mod projector;

pub use cluster::{zoom_into, ClusterEngine, MapCommand, CLUSTER_RADIUS_PX};
pub use marker::{MarkerState, MarkerStateStore, DEFAULT_ANIMATION_WINDOW, USER_POSITION_ID};
pub use projector::{project, viewport_around, PixelPoint, ViewportProjector};
