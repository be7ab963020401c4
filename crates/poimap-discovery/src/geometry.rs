//! Coordinate pair parsing.
//!
//! Both services encode a position as `[lng, lat]`, usually serialized into a
//! string and occasionally as a bare JSON array.

use poimap_core::{GeoPoint, GeometryRef};

use crate::error::DiscoveryError;

/// Parse a `[lng, lat]` geometry reference into a validated [`GeoPoint`].
///
/// # Errors
///
/// Returns [`DiscoveryError::GeometryParse`] when the payload is not a
/// two-element numeric array or the coordinates fall outside WGS84 range.
pub fn parse_geometry(geometry: &GeometryRef) -> Result<GeoPoint, DiscoveryError> {
    let (raw, pair) = match geometry {
        GeometryRef::Serialized(s) => {
            let pair = serde_json::from_str::<Vec<f64>>(s.trim()).map_err(|e| {
                DiscoveryError::GeometryParse {
                    raw: s.clone(),
                    reason: e.to_string(),
                }
            })?;
            (s.clone(), pair)
        }
        GeometryRef::Pair(values) => (format!("{values:?}"), values.clone()),
        GeometryRef::Other(value) => {
            return Err(DiscoveryError::GeometryParse {
                raw: value.to_string(),
                reason: "expected a [lng, lat] pair".to_owned(),
            });
        }
    };

    let [lng, lat] = pair[..] else {
        return Err(DiscoveryError::GeometryParse {
            reason: format!("expected [lng, lat], got {} values", pair.len()),
            raw,
        });
    };

    let point = GeoPoint::new(lat, lng);
    if !point.is_valid() {
        return Err(DiscoveryError::GeometryParse {
            raw,
            reason: "coordinates out of range".to_owned(),
        });
    }
    Ok(point)
}
