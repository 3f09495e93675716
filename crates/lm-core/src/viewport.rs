//! Rectangular map bounds and the viewport (bounds + zoom) produced by the
//! map widget on every pan/zoom.

use crate::{CoreError, CoreResult, GeoPoint};

/// An axis-aligned geographic bounding box.
///
/// Edges are inclusive.  Boxes crossing the antimeridian are not supported
/// (`west <= east` is enforced by [`Bounds::new`]).
#[derive(Copy, Clone, Debug, PartialEq)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct Bounds {
    pub west:  f64,
    pub south: f64,
    pub east:  f64,
    pub north: f64,
}

impl Bounds {
    /// Validated constructor.
    pub fn new(west: f64, south: f64, east: f64, north: f64) -> CoreResult<Self> {
        let b = Self { west, south, east, north };
        let finite = [west, south, east, north].iter().all(|v| v.is_finite());
        if !finite || west > east || south > north {
            return Err(CoreError::Parse(format!("invalid bounds {b}")));
        }
        Ok(b)
    }

    /// Bounds spanning the two corner points in any order.
    pub fn from_corners(a: GeoPoint, b: GeoPoint) -> Self {
        Self {
            west:  a.lon.min(b.lon),
            south: a.lat.min(b.lat),
            east:  a.lon.max(b.lon),
            north: a.lat.max(b.lat),
        }
    }

    /// Square box of half-width `half_deg` around `center`.
    pub fn around(center: GeoPoint, half_deg: f64) -> Self {
        Self {
            west:  center.lon - half_deg,
            south: center.lat - half_deg,
            east:  center.lon + half_deg,
            north: center.lat + half_deg,
        }
    }

    #[inline]
    pub fn contains(&self, p: GeoPoint) -> bool {
        p.lat >= self.south && p.lat <= self.north && p.lon >= self.west && p.lon <= self.east
    }

    pub fn center(&self) -> GeoPoint {
        GeoPoint::new((self.south + self.north) * 0.5, (self.west + self.east) * 0.5)
    }

    /// Shift the box by the given degree offsets (a pan).
    pub fn translate(&self, d_lat: f64, d_lon: f64) -> Self {
        Self {
            west:  self.west + d_lon,
            south: self.south + d_lat,
            east:  self.east + d_lon,
            north: self.north + d_lat,
        }
    }
}

impl std::fmt::Display for Bounds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{:.6},{:.6},{:.6},{:.6}]",
            self.west, self.south, self.east, self.north
        )
    }
}

/// The visible map region as reported by the map widget.
///
/// `zoom` is the integer (floored) slippy-map zoom level; it gates fetching,
/// routing, and the cache TTL.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Viewport {
    pub bounds: Bounds,
    pub zoom:   u8,
}

impl Viewport {
    pub fn new(bounds: Bounds, zoom: u8) -> Self {
        Self { bounds, zoom }
    }

    #[inline]
    pub fn contains(&self, p: GeoPoint) -> bool {
        self.bounds.contains(p)
    }
}
