//! User-visible advisories.
//!
//! Only location failures and search failures ever reach the visitor. Item
//! level enrichment failures are logged and counted but never surfaced here.

use serde::Serialize;
use thiserror::Error;

/// Why the device location could not be resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Error)]
#[serde(rename_all = "snake_case")]
pub enum LocationFailure {
    #[error("location permission denied")]
    PermissionDenied,
    #[error("position unavailable")]
    PositionUnavailable,
    #[error("location request timed out")]
    Timeout,
    #[error("unknown location error")]
    Unknown,
}

impl LocationFailure {
    /// Message shown to the visitor.
    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            LocationFailure::PermissionDenied => {
                "Location access was denied. Search for a place to explore nearby points of interest."
            }
            LocationFailure::PositionUnavailable => {
                "Your position could not be determined. Search for a place instead."
            }
            LocationFailure::Timeout => {
                "Finding your position took too long. Try again or search for a place."
            }
            LocationFailure::Unknown => {
                "Something went wrong while locating you. Search for a place instead."
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Advisory {
    LocationUnavailable { failure: LocationFailure },
    SearchFailed { reason: String },
}

impl Advisory {
    #[must_use]
    pub fn message(&self) -> &'static str {
        match self {
            Advisory::LocationUnavailable { failure } => failure.message(),
            Advisory::SearchFailed { .. } => {
                "Nearby places could not be loaded right now. Please try again shortly."
            }
        }
    }
}

impl From<LocationFailure> for Advisory {
    fn from(failure: LocationFailure) -> Self {
        Advisory::LocationUnavailable { failure }
    }
}

impl std::fmt::Display for Advisory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_failure_kind_has_a_distinct_message() {
        let kinds = [
            LocationFailure::PermissionDenied,
            LocationFailure::PositionUnavailable,
            LocationFailure::Timeout,
            LocationFailure::Unknown,
        ];
        let messages: std::collections::HashSet<_> =
            kinds.iter().map(|k| k.message()).collect();
        assert_eq!(messages.len(), kinds.len());
    }

    #[test]
    fn advisory_serializes_with_kind_tag() {
        let advisory = Advisory::from(LocationFailure::Timeout);
        let json = serde_json::to_value(&advisory).unwrap();
        assert_eq!(json["kind"], "location_unavailable");
        assert_eq!(json["failure"], "timeout");
    }
}
