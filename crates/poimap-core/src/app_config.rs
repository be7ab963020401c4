use std::time::Duration;

use crate::geo::GeoPoint;
use crate::radius::SearchRadius;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    pub search_base_url: String,
    pub enrichment_base_url: String,
    /// Suffix appended to candidate ids when requesting enrichment (`{id}_{locale}`).
    pub locale: String,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub max_concurrent_enrichments: usize,
    pub max_retries: u32,
    pub retry_backoff_base_ms: u64,
    /// Center used before any location is known.
    pub default_center: GeoPoint,
    pub default_radius: SearchRadius,
    pub animation_window_ms: u64,
}

impl AppConfig {
    #[must_use]
    pub fn animation_window(&self) -> Duration {
        Duration::from_millis(self.animation_window_ms)
    }
}
