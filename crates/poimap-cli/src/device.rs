//! Location source for hosts without a geolocation API.

use poimap_core::GeoPoint;
use poimap_discovery::{LocationSource, PositionError, PositionOptions};

/// Always reports the position as unavailable, so discovery waits for a manual place.
pub(crate) struct NoDeviceLocation;

impl LocationSource for NoDeviceLocation {
    async fn current_position(
        &self,
        _options: &PositionOptions,
    ) -> Result<GeoPoint, PositionError> {
        Err(PositionError::PositionUnavailable)
    }
}
