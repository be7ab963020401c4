//! Geographic ↔ pixel conversion for the current viewport.
//!
//! Uses Web Mercator world pixels (256 px tiles) at the viewport zoom, offset
//! so the viewport's northwest corner sits at `(0, 0)`.

use std::f64::consts::PI;

use poimap_core::{GeoPoint, ViewportBounds};
use serde::Serialize;

pub const TILE_SIZE: f64 = 256.0;

/// Latitude limit of the Web Mercator projection.
const MAX_MERCATOR_LAT: f64 = 85.051_128_78;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PixelPoint {
    pub x: f64,
    pub y: f64,
}

impl PixelPoint {
    #[must_use]
    pub fn distance(&self, other: &PixelPoint) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

fn world_size(zoom: u8) -> f64 {
    TILE_SIZE * 2f64.powi(i32::from(zoom))
}

fn to_world(point: GeoPoint, scale: f64) -> PixelPoint {
    let lat = point.lat.clamp(-MAX_MERCATOR_LAT, MAX_MERCATOR_LAT).to_radians();
    let x = (point.lng + 180.0) / 360.0 * scale;
    let y = (0.5 - ((1.0 + lat.sin()) / (1.0 - lat.sin())).ln() / (4.0 * PI)) * scale;
    PixelPoint { x, y }
}

fn from_world(pixel: PixelPoint, scale: f64) -> GeoPoint {
    let lng = pixel.x / scale * 360.0 - 180.0;
    let n = PI - 2.0 * PI * pixel.y / scale;
    let lat = n.sinh().atan().to_degrees();
    GeoPoint::new(lat, lng)
}

/// Projector bound to one viewport. Cheap to build; rebuilt on every cluster pass.
#[derive(Debug, Clone, Copy)]
pub struct ViewportProjector {
    origin: PixelPoint,
    scale: f64,
}

impl ViewportProjector {
    #[must_use]
    pub fn new(bounds: &ViewportBounds) -> Self {
        let scale = world_size(bounds.zoom);
        Self {
            origin: to_world(bounds.northwest(), scale),
            scale,
        }
    }

    #[must_use]
    pub fn project(&self, point: GeoPoint) -> PixelPoint {
        let world = to_world(point, self.scale);
        PixelPoint {
            x: world.x - self.origin.x,
            y: world.y - self.origin.y,
        }
    }

    #[must_use]
    pub fn unproject(&self, pixel: PixelPoint) -> GeoPoint {
        from_world(
            PixelPoint {
                x: pixel.x + self.origin.x,
                y: pixel.y + self.origin.y,
            },
            self.scale,
        )
    }
}

/// Project `point` into the pixel space of `bounds`.
#[must_use]
pub fn project(point: GeoPoint, bounds: &ViewportBounds) -> PixelPoint {
    ViewportProjector::new(bounds).project(point)
}

/// Bounds of a `width` × `height` pixel viewport centered on `center`.
#[must_use]
pub fn viewport_around(center: GeoPoint, zoom: u8, width: u32, height: u32) -> ViewportBounds {
    let scale = world_size(zoom);
    let mid = to_world(center, scale);
    let half_w = f64::from(width) / 2.0;
    let half_h = f64::from(height) / 2.0;
    let northeast = from_world(
        PixelPoint {
            x: mid.x + half_w,
            y: mid.y - half_h,
        },
        scale,
    );
    let southwest = from_world(
        PixelPoint {
            x: mid.x - half_w,
            y: mid.y + half_h,
        },
        scale,
    );
    ViewportBounds {
        northeast,
        southwest,
        zoom,
    }
}
