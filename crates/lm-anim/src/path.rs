//! Validated animation paths.

use lm_core::GeoPoint;

use crate::{AnimError, AnimResult};

/// An ordered polyline with at least two valid points.
///
/// Paths arrive from routing services as `[lon, lat]` pairs of uneven
/// quality; [`AnimationPath::from_lon_lat`] is where they are cleaned up.
#[derive(Clone, Debug, PartialEq)]
pub struct AnimationPath {
    points: Vec<GeoPoint>,
}

impl AnimationPath {
    /// Build from wire-order `[lon, lat]` pairs.
    ///
    /// Non-finite or out-of-range pairs are discarded.  If exactly one
    /// survives, `current` (the marker's displayed position) is prepended so
    /// there is a segment to interpolate along.
    ///
    /// # Errors
    ///
    /// [`AnimError::EmptyPath`] when no pair is valid.
    pub fn from_lon_lat(raw: &[[f64; 2]], current: GeoPoint) -> AnimResult<Self> {
        let points = raw.iter().copied().map(GeoPoint::from_lon_lat).collect();
        Self::from_points(points, current)
    }

    /// Same as [`from_lon_lat`](Self::from_lon_lat) for points already in
    /// `GeoPoint` form.
    pub fn from_points(points: Vec<GeoPoint>, current: GeoPoint) -> AnimResult<Self> {
        let mut points: Vec<GeoPoint> = points.into_iter().filter(|p| p.is_valid()).collect();
        match points.len() {
            0 => Err(AnimError::EmptyPath),
            1 => {
                points.insert(0, current);
                Ok(Self { points })
            }
            _ => Ok(Self { points }),
        }
    }

    /// Two-point path.
    pub fn straight(from: GeoPoint, to: GeoPoint) -> Self {
        Self { points: vec![from, to] }
    }

    #[inline]
    pub fn points(&self) -> &[GeoPoint] {
        &self.points
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always `false`; a path has at least two points.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn segments(&self) -> usize {
        self.points.len() - 1
    }

    pub fn start(&self) -> GeoPoint {
        self.points[0]
    }

    pub fn end(&self) -> GeoPoint {
        self.points[self.points.len() - 1]
    }

    /// Position at `progress ∈ [0, 1]` with uniform time per segment:
    /// `index = progress × segments`, then a component-wise lerp between
    /// the two bracketing points.
    pub fn sample(&self, progress: f64) -> GeoPoint {
        let progress = progress.clamp(0.0, 1.0);
        let index = progress * self.segments() as f64;
        let seg = (index.floor() as usize).min(self.segments() - 1);
        let t = index - seg as f64;
        self.points[seg].lerp(self.points[seg + 1], t)
    }
}
