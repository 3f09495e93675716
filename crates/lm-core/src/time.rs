//! Frame clock.
//!
//! # Design
//!
//! Animation is driven by explicit frame timestamps rather than by reading a
//! clock internally.  A `FrameTime` is a millisecond reading from a
//! monotonic source (the renderer's frame callback, or a simulated clock in
//! tests):
//!
//!   progress = (elapsed unpaused ms) / duration_ms
//!
//! Passing time in keeps every interpolation step deterministic and lets
//! tests step through an animation frame by frame.

use std::fmt;

/// A monotonic frame timestamp in milliseconds.
#[derive(Copy, Clone, PartialEq, PartialOrd, Debug, Default)]
pub struct FrameTime(pub f64);

impl FrameTime {
    pub const ZERO: FrameTime = FrameTime(0.0);

    #[inline]
    pub fn from_millis(ms: f64) -> Self {
        FrameTime(ms)
    }

    #[inline]
    pub fn as_millis(self) -> f64 {
        self.0
    }

    /// Milliseconds elapsed from `earlier` to `self`, clamped at zero so a
    /// non-monotonic source never runs an animation backwards.
    #[inline]
    pub fn since(self, earlier: FrameTime) -> f64 {
        (self.0 - earlier.0).max(0.0)
    }
}

impl std::ops::Add<f64> for FrameTime {
    type Output = FrameTime;
    #[inline]
    fn add(self, rhs: f64) -> FrameTime {
        FrameTime(self.0 + rhs)
    }
}

impl fmt::Display for FrameTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}ms", self.0)
    }
}
