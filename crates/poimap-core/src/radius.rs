//! Search radius value and the controller that owns the active radius.

use serde::{Deserialize, Serialize};

use crate::geo::GeoPoint;

/// Search radius in meters, always within `[MIN_METERS, MAX_METERS]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SearchRadius(u32);

impl SearchRadius {
    pub const MIN_METERS: u32 = 1_000;
    pub const MAX_METERS: u32 = 50_000;
    pub const DEFAULT_METERS: u32 = 5_000;

    /// Quick-select values offered by the radius picker.
    pub const QUICK_SELECT: [u32; 6] = [1_000, 2_000, 5_000, 10_000, 20_000, 50_000];

    /// Clamp any integer to the nearest valid radius.
    #[must_use]
    pub fn clamped(meters: i64) -> Self {
        let bounded = meters.clamp(i64::from(Self::MIN_METERS), i64::from(Self::MAX_METERS));
        // Bounded above by MAX_METERS, so the conversion cannot fail.
        Self(u32::try_from(bounded).unwrap_or(Self::MAX_METERS))
    }

    #[must_use]
    pub const fn meters(self) -> u32 {
        self.0
    }
}

impl Default for SearchRadius {
    fn default() -> Self {
        Self(Self::DEFAULT_METERS)
    }
}

impl std::fmt::Display for SearchRadius {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.0 % 1_000 == 0 {
            write!(f, "{} km", self.0 / 1_000)
        } else {
            write!(f, "{} m", self.0)
        }
    }
}

/// Outcome of a radius update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RadiusChange {
    /// The clamped value equals the current radius.
    Unchanged(SearchRadius),
    Changed {
        radius: SearchRadius,
        /// Whether a discovery cycle should run immediately for the new radius.
        trigger_search: bool,
    },
}

/// Owns the active search radius.
///
/// The controller only decides; the orchestrating layer runs the discovery
/// cycle when [`RadiusChange::Changed`] asks for one.
#[derive(Debug, Clone)]
pub struct RadiusController {
    radius: SearchRadius,
    default_center: GeoPoint,
}

impl RadiusController {
    #[must_use]
    pub fn new(radius: SearchRadius, default_center: GeoPoint) -> Self {
        Self {
            radius,
            default_center,
        }
    }

    #[must_use]
    pub fn radius(&self) -> SearchRadius {
        self.radius
    }

    /// Clamp and apply `meters`.
    ///
    /// A re-search is requested when the POI set is non-empty or the current
    /// center has moved away from the system default.
    pub fn set_radius(&mut self, meters: i64, center: GeoPoint, poi_count: usize) -> RadiusChange {
        let radius = SearchRadius::clamped(meters);
        if radius == self.radius {
            return RadiusChange::Unchanged(radius);
        }
        self.radius = radius;
        let trigger_search = poi_count > 0 || center != self.default_center;
        RadiusChange::Changed {
            radius,
            trigger_search,
        }
    }

    /// Apply one of the quick-select values by index. Out-of-range indexes are ignored.
    pub fn quick_select(
        &mut self,
        index: usize,
        center: GeoPoint,
        poi_count: usize,
    ) -> Option<RadiusChange> {
        let meters = SearchRadius::QUICK_SELECT.get(index).copied()?;
        Some(self.set_radius(i64::from(meters), center, poi_count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEFAULT_CENTER: GeoPoint = GeoPoint::new(45.4642, 9.19);

    #[test]
    fn clamps_out_of_range_values_to_nearest_bound() {
        assert_eq!(SearchRadius::clamped(0).meters(), 1_000);
        assert_eq!(SearchRadius::clamped(-40).meters(), 1_000);
        assert_eq!(SearchRadius::clamped(999).meters(), 1_000);
        assert_eq!(SearchRadius::clamped(50_001).meters(), 50_000);
        assert_eq!(SearchRadius::clamped(i64::MAX).meters(), 50_000);
    }

    #[test]
    fn in_range_values_are_kept() {
        for meters in [1_000, 1_234, 5_000, 49_999, 50_000] {
            assert_eq!(SearchRadius::clamped(meters).meters(), u32::try_from(meters).unwrap());
        }
    }

    #[test]
    fn default_radius_is_five_km() {
        assert_eq!(SearchRadius::default().meters(), 5_000);
        assert_eq!(SearchRadius::default().to_string(), "5 km");
        assert_eq!(SearchRadius::clamped(1_500).to_string(), "1500 m");
    }

    #[test]
    fn unchanged_radius_never_triggers_search() {
        let mut controller = RadiusController::new(SearchRadius::default(), DEFAULT_CENTER);
        let change = controller.set_radius(5_000, GeoPoint::new(1.0, 1.0), 10);
        assert_eq!(change, RadiusChange::Unchanged(SearchRadius::default()));
    }

    #[test]
    fn change_at_default_center_with_no_pois_does_not_search() {
        let mut controller = RadiusController::new(SearchRadius::default(), DEFAULT_CENTER);
        let change = controller.set_radius(10_000, DEFAULT_CENTER, 0);
        assert_eq!(
            change,
            RadiusChange::Changed {
                radius: SearchRadius::clamped(10_000),
                trigger_search: false
            }
        );
        assert_eq!(controller.radius().meters(), 10_000);
    }

    #[test]
    fn change_with_pois_triggers_search() {
        let mut controller = RadiusController::new(SearchRadius::default(), DEFAULT_CENTER);
        let change = controller.set_radius(2_000, DEFAULT_CENTER, 3);
        assert!(matches!(
            change,
            RadiusChange::Changed {
                trigger_search: true,
                ..
            }
        ));
    }

    #[test]
    fn change_with_moved_center_triggers_search() {
        let mut controller = RadiusController::new(SearchRadius::default(), DEFAULT_CENTER);
        let change = controller.set_radius(100_000, GeoPoint::new(41.9, 12.5), 0);
        assert_eq!(
            change,
            RadiusChange::Changed {
                radius: SearchRadius::clamped(50_000),
                trigger_search: true
            }
        );
    }

    #[test]
    fn quick_select_uses_same_contract() {
        let mut controller = RadiusController::new(SearchRadius::default(), DEFAULT_CENTER);
        let change = controller.quick_select(0, DEFAULT_CENTER, 1);
        assert_eq!(
            change,
            Some(RadiusChange::Changed {
                radius: SearchRadius::clamped(1_000),
                trigger_search: true
            })
        );
        assert_eq!(controller.quick_select(99, DEFAULT_CENTER, 1), None);
    }
}
