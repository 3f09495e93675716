//! The per-entity animation task table.

use std::collections::BTreeMap;

use lm_core::{EntityId, FrameTime, GeoPoint, Viewport};

use crate::{AnimationPath, AnimationTask, MarkerRegistry, OnComplete, TaskOutcome};

/// Redraw threshold used by [`AnimationScheduler::default`] (≈ 0.5 m).
pub const DEFAULT_REDRAW_EPSILON_DEG: f64 = 0.000_005;

/// Result of [`AnimationScheduler::animate`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TaskStart {
    /// A task is now in the table and will run on subsequent frames.
    Running,
    /// The request completed immediately; the callback has already fired.
    Completed(TaskOutcome),
}

/// What one [`advance`](AnimationScheduler::advance) call changed.
#[derive(Debug, Default, PartialEq)]
pub struct FrameReport {
    /// Markers whose displayed position changed, with the new position.
    pub moved: Vec<(EntityId, GeoPoint)>,
    /// Tasks that ended this frame.
    pub finished: Vec<(EntityId, TaskOutcome)>,
}

impl FrameReport {
    pub fn is_empty(&self) -> bool {
        self.moved.is_empty() && self.finished.is_empty()
    }
}

/// At most one running [`AnimationTask`] per entity, advanced by explicit
/// frame timestamps.
///
/// Tasks are keyed by `EntityId` in a `BTreeMap` so every frame visits
/// markers in the same order.
pub struct AnimationScheduler {
    tasks:              BTreeMap<EntityId, AnimationTask>,
    redraw_epsilon_deg: f64,
}

impl Default for AnimationScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_REDRAW_EPSILON_DEG)
    }
}

impl AnimationScheduler {
    pub fn new(redraw_epsilon_deg: f64) -> Self {
        Self { tasks: BTreeMap::new(), redraw_epsilon_deg }
    }

    // ── Starting tasks ────────────────────────────────────────────────────

    /// Animate marker `id` along `points` over `duration_ms`.
    ///
    /// Any task already running for `id` is retired first and completes as
    /// [`TaskOutcome::Superseded`].  Then, in order:
    ///
    /// 1. invalid points are discarded; none left → `InvalidPath`, the
    ///    marker settles on its snapshot position;
    /// 2. a single valid point gets the displayed position prepended;
    /// 3. a marker displayed outside `viewport` is snapped to the last
    ///    point → `OutOfViewAtStart`;
    /// 4. otherwise the task is stored and runs from the next frame.
    ///
    /// An unknown `id` completes immediately as `Orphaned`.
    pub fn animate(
        &mut self,
        markers:     &mut MarkerRegistry,
        id:          &EntityId,
        points:      Vec<GeoPoint>,
        duration_ms: f64,
        viewport:    &Viewport,
        on_complete: Option<OnComplete>,
    ) -> TaskStart {
        let Some(marker) = markers.get_mut(id) else {
            return finish_now(on_complete, TaskOutcome::Orphaned);
        };

        if let Some(mut previous) = self.tasks.remove(id) {
            previous.complete(TaskOutcome::Superseded);
            marker.animating = false;
        }

        let path = match AnimationPath::from_points(points, marker.displayed) {
            Ok(path) => path,
            Err(e) => {
                tracing::debug!(entity = %id, "{e}");
                marker.displayed = marker.snapshot_position;
                return finish_now(on_complete, TaskOutcome::InvalidPath);
            }
        };

        if !viewport.contains(marker.displayed) {
            marker.displayed = path.end();
            return finish_now(on_complete, TaskOutcome::OutOfViewAtStart);
        }

        marker.animating = true;
        self.tasks.insert(id.clone(), AnimationTask::new(path, duration_ms, on_complete));
        TaskStart::Running
    }

    /// [`animate`](Self::animate) for wire-order `[lon, lat]` pairs.
    pub fn animate_lon_lat(
        &mut self,
        markers:     &mut MarkerRegistry,
        id:          &EntityId,
        raw:         &[[f64; 2]],
        duration_ms: f64,
        viewport:    &Viewport,
        on_complete: Option<OnComplete>,
    ) -> TaskStart {
        let points = raw.iter().copied().map(GeoPoint::from_lon_lat).collect();
        self.animate(markers, id, points, duration_ms, viewport, on_complete)
    }

    // ── Frame loop ────────────────────────────────────────────────────────

    /// Advance every task to `now`.
    ///
    /// Paused (hovered) markers keep their task but do not progress.  A
    /// task whose progress reaches 1, or whose marker is displayed outside
    /// `viewport`, snaps the marker to its last point and completes.  The
    /// displayed position is only rewritten when it changes by more than
    /// the redraw threshold.
    pub fn advance(
        &mut self,
        now:      FrameTime,
        viewport: &Viewport,
        markers:  &mut MarkerRegistry,
    ) -> FrameReport {
        let mut report = FrameReport::default();
        let mut ended: Vec<(EntityId, TaskOutcome)> = Vec::new();

        for (id, task) in self.tasks.iter_mut() {
            let Some(marker) = markers.get_mut(id) else {
                ended.push((id.clone(), TaskOutcome::Orphaned));
                continue;
            };

            let progress = task.tick(now, marker.hovered);
            if marker.hovered {
                continue;
            }

            let outcome = if progress >= 1.0 {
                Some(TaskOutcome::Finished)
            } else if !viewport.contains(marker.displayed) {
                Some(TaskOutcome::LeftViewport)
            } else {
                None
            };

            match outcome {
                Some(outcome) => {
                    let end = task.path().end();
                    if marker.displayed != end {
                        marker.displayed = end;
                        report.moved.push((id.clone(), end));
                    }
                    ended.push((id.clone(), outcome));
                }
                None => {
                    let next = task.path().sample(progress);
                    if next.differs_from(marker.displayed, self.redraw_epsilon_deg) {
                        marker.displayed = next;
                        report.moved.push((id.clone(), next));
                    }
                }
            }
        }

        for (id, outcome) in ended {
            if let Some(mut task) = self.tasks.remove(&id) {
                task.complete(outcome);
            }
            if let Some(marker) = markers.get_mut(&id) {
                marker.animating = false;
            }
            report.finished.push((id, outcome));
        }

        report
    }

    // ── Early termination & queries ───────────────────────────────────────

    /// Retire the task for `id`, leaving the marker where it is.  Returns
    /// `false` if nothing was running.
    pub fn cancel(&mut self, id: &EntityId, markers: &mut MarkerRegistry) -> bool {
        let Some(mut task) = self.tasks.remove(id) else {
            return false;
        };
        task.complete(TaskOutcome::Cancelled);
        if let Some(marker) = markers.get_mut(id) {
            marker.animating = false;
        }
        true
    }

    pub fn is_animating(&self, id: &EntityId) -> bool {
        self.tasks.contains_key(id)
    }

    pub fn task(&self, id: &EntityId) -> Option<&AnimationTask> {
        self.tasks.get(id)
    }

    pub fn active_count(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_idle(&self) -> bool {
        self.tasks.is_empty()
    }
}

fn finish_now(on_complete: Option<OnComplete>, outcome: TaskOutcome) -> TaskStart {
    if let Some(callback) = on_complete {
        callback(outcome);
    }
    TaskStart::Completed(outcome)
}
