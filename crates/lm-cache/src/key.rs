//! Viewport quantization.
//!
//! Small pans must not produce a new cache key, so the viewport is snapped
//! **outward** to a fixed degree grid:
//!
//! ```text
//! west'  = floor(west  / g) · g
//! south' = floor(south / g) · g
//! east'  = floor(east  / g) · g + g
//! north' = floor(north / g) · g + g
//! ```
//!
//! The quantized box always contains the original one, so a single fetch of
//! the key's bounds covers the whole viewport.  Edges are stored as integer
//! micro-degrees (six decimals) so equal keys compare and hash equal
//! without floating-point surprises.

use std::fmt;

use lm_core::Bounds;

/// Absorbs division error for viewport edges that sit exactly on a grid
/// line (e.g. `0.3 / 0.1 = 2.9999999999999996`).
const GRID_EPS: f64 = 1e-9;

const MICRO: f64 = 1_000_000.0;

/// Quantized bounding box; the cache's lookup and in-flight key.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct CacheKey {
    west:  i64,
    south: i64,
    east:  i64,
    north: i64,
}

impl CacheKey {
    /// Snap `bounds` outward to a `grid_deg` grid.
    pub fn quantize(bounds: &Bounds, grid_deg: f64) -> Self {
        let down = |v: f64| (v / grid_deg + GRID_EPS).floor() * grid_deg;
        Self {
            west:  to_micro(down(bounds.west)),
            south: to_micro(down(bounds.south)),
            east:  to_micro(down(bounds.east) + grid_deg),
            north: to_micro(down(bounds.north) + grid_deg),
        }
    }

    /// The quantized box in degrees; what gets fetched for this key.
    pub fn bounds(&self) -> Bounds {
        Bounds {
            west:  self.west as f64 / MICRO,
            south: self.south as f64 / MICRO,
            east:  self.east as f64 / MICRO,
            north: self.north as f64 / MICRO,
        }
    }
}

#[inline]
fn to_micro(deg: f64) -> i64 {
    (deg * MICRO).round() as i64
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = self.bounds();
        write!(f, "{:.6},{:.6},{:.6},{:.6}", b.west, b.south, b.east, b.north)
    }
}
