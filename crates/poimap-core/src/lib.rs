pub mod advisory;
pub mod app_config;
pub mod config;
pub mod geo;
pub mod poi;
pub mod radius;

pub use advisory::{Advisory, LocationFailure};
pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use geo::{Cluster, GeoPoint, MarkerKind, ViewportBounds, MAX_CLUSTER_ZOOM};
pub use poi::{EnrichedPoi, GeometryRef, PublicFlag, RawCandidate};
pub use radius::{RadiusChange, RadiusController, SearchRadius};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
