//! Visitor location resolution.
//!
//! Wraps a device geolocation source with the request policy the map uses:
//! one high-accuracy request per page lifetime (or per explicit retry), a
//! hard timeout, and no cached positions.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use poimap_core::{GeoPoint, LocationFailure};
use serde::Serialize;
use thiserror::Error;

/// Request options passed through to the location source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionOptions {
    pub high_accuracy: bool,
    pub timeout: Duration,
    /// Zero disables reuse of cached positions.
    pub maximum_age: Duration,
}

impl Default for PositionOptions {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            timeout: Duration::from_secs(10),
            maximum_age: Duration::ZERO,
        }
    }
}

/// Failure reported by a location source.
#[derive(Debug, Clone, Error)]
pub enum PositionError {
    #[error("permission denied")]
    PermissionDenied,
    #[error("position unavailable")]
    PositionUnavailable,
    #[error("timeout")]
    Timeout,
    #[error("location source error: {0}")]
    Other(String),
}

impl PositionError {
    #[must_use]
    pub fn failure(&self) -> LocationFailure {
        match self {
            PositionError::PermissionDenied => LocationFailure::PermissionDenied,
            PositionError::PositionUnavailable => LocationFailure::PositionUnavailable,
            PositionError::Timeout => LocationFailure::Timeout,
            PositionError::Other(_) => LocationFailure::Unknown,
        }
    }
}

/// Device or OS geolocation API.
pub trait LocationSource {
    fn current_position(
        &self,
        options: &PositionOptions,
    ) -> impl Future<Output = Result<GeoPoint, PositionError>> + Send;
}

/// A place picked by the visitor, e.g. from an address autocomplete.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ManualPlace {
    pub point: GeoPoint,
    pub label: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Resolution {
    Resolved(GeoPoint),
    Failed(LocationFailure),
    /// Nothing was requested: a request is already outstanding, or the
    /// one-per-lifetime attempt has been used and no retry was asked for.
    Skipped,
}

pub struct LocationProvider<L> {
    source: L,
    options: PositionOptions,
    in_flight: AtomicBool,
    attempted: AtomicBool,
}

struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl<L: LocationSource> LocationProvider<L> {
    pub fn new(source: L) -> Self {
        Self::with_options(source, PositionOptions::default())
    }

    pub fn with_options(source: L, options: PositionOptions) -> Self {
        Self {
            source,
            options,
            in_flight: AtomicBool::new(false),
            attempted: AtomicBool::new(false),
        }
    }

    #[must_use]
    pub fn options(&self) -> PositionOptions {
        self.options
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Resolve the visitor's position, at most once per provider lifetime.
    pub async fn resolve(&self) -> Resolution {
        if self.attempted.load(Ordering::Acquire) {
            return Resolution::Skipped;
        }
        self.request().await
    }

    /// Explicit user retry: re-arms the provider and requests again.
    ///
    /// Still a no-op while a request is outstanding.
    pub async fn retry(&self) -> Resolution {
        self.request().await
    }

    async fn request(&self) -> Resolution {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::debug!("location request already outstanding");
            return Resolution::Skipped;
        }
        let _guard = InFlightGuard(&self.in_flight);
        self.attempted.store(true, Ordering::Release);

        let request = self.source.current_position(&self.options);
        let resolution = match tokio::time::timeout(self.options.timeout, request).await {
            Err(_) => Resolution::Failed(LocationFailure::Timeout),
            Ok(Err(err)) => Resolution::Failed(err.failure()),
            Ok(Ok(point)) if !point.is_valid() => {
                Resolution::Failed(LocationFailure::PositionUnavailable)
            }
            Ok(Ok(point)) => Resolution::Resolved(point),
        };

        match resolution {
            Resolution::Resolved(point) => tracing::info!(%point, "visitor location resolved"),
            Resolution::Failed(failure) => {
                tracing::warn!(error = %failure, "visitor location unavailable");
            }
            Resolution::Skipped => {}
        }
        resolution
    }
}
