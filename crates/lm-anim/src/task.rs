//! A single marker animation.

use std::fmt;

use lm_core::FrameTime;

use crate::AnimationPath;

/// Completion callback.  Invoked exactly once per task.
pub type OnComplete = Box<dyn FnOnce(TaskOutcome) + Send>;

/// How an animation task ended.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TaskOutcome {
    /// Progress reached 1; the marker sits on the last path point.
    Finished,
    /// The marker left the viewport mid-flight and was snapped to the end.
    LeftViewport,
    /// The marker was outside the viewport when the task was requested and
    /// was snapped to the end without animating.
    OutOfViewAtStart,
    /// No valid path point; the marker did not move.
    InvalidPath,
    /// A newer task for the same marker took over.
    Superseded,
    /// Retired by the caller.
    Cancelled,
    /// The marker disappeared from the registry.
    Orphaned,
}

/// Interpolation state for one marker.
///
/// The clock is an accumulator: each frame adds the time since the previous
/// frame unless the marker is paused, so a hover freezes progress and the
/// animation resumes from the same fraction.  The first frame only binds the
/// baseline.
pub struct AnimationTask {
    path:        AnimationPath,
    duration_ms: f64,
    elapsed_ms:  f64,
    last_frame:  Option<FrameTime>,
    on_complete: Option<OnComplete>,
}

impl AnimationTask {
    pub fn new(path: AnimationPath, duration_ms: f64, on_complete: Option<OnComplete>) -> Self {
        let duration_ms = if duration_ms.is_finite() { duration_ms.max(0.0) } else { 0.0 };
        Self { path, duration_ms, elapsed_ms: 0.0, last_frame: None, on_complete }
    }

    #[inline]
    pub fn path(&self) -> &AnimationPath {
        &self.path
    }

    #[inline]
    pub fn duration_ms(&self) -> f64 {
        self.duration_ms
    }

    /// Unpaused time accumulated so far.
    #[inline]
    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed_ms
    }

    /// `true` once a frame has bound the baseline.
    pub fn has_started(&self) -> bool {
        self.last_frame.is_some()
    }

    /// Fraction complete; may exceed 1 on the frame that finishes the task.
    pub fn progress(&self) -> f64 {
        if self.duration_ms <= 0.0 {
            return 1.0;
        }
        self.elapsed_ms / self.duration_ms
    }

    /// Advance the clock to `now` and return the new progress.
    pub fn tick(&mut self, now: FrameTime, paused: bool) -> f64 {
        if let Some(prev) = self.last_frame {
            if !paused {
                self.elapsed_ms += now.since(prev);
            }
        }
        self.last_frame = Some(now);
        self.progress()
    }

    /// Fire the completion callback.  Later calls are no-ops.
    pub(crate) fn complete(&mut self, outcome: TaskOutcome) {
        if let Some(callback) = self.on_complete.take() {
            callback(outcome);
        }
    }
}

impl Drop for AnimationTask {
    fn drop(&mut self) {
        self.complete(TaskOutcome::Cancelled);
    }
}

impl fmt::Debug for AnimationTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimationTask")
            .field("points", &self.path.len())
            .field("duration_ms", &self.duration_ms)
            .field("elapsed_ms", &self.elapsed_ms)
            .field("started", &self.has_started())
            .field("pending_callback", &self.on_complete.is_some())
            .finish()
    }
}
