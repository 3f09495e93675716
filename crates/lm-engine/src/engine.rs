//! The `Engine` struct: batch reconciliation, the frame loop, and refresh.

use std::collections::BTreeSet;

use lm_anim::{
    AnimationScheduler, FrameReport, MarkerRegistry, OnComplete, TaskOutcome, TaskStart,
    TrackedMarker,
};
use lm_cache::{CacheStats, ViewportCache};
use lm_core::{DynLog, EngineConfig, EntityId, EntitySnapshot, EventKind, FrameTime, GeoPoint, Viewport};
use lm_spatial::RouteResolver;

use crate::store::IdSet;
use crate::{EngineResult, MarkerSink, PositionStore, RefreshCadence};

// ── ReconcileReport ───────────────────────────────────────────────────────────

/// What one [`Engine::reconcile`] call did, in batch order.
#[derive(Debug, Default, PartialEq)]
pub struct ReconcileReport {
    /// New markers for entities that appeared inside the viewport.
    pub added: Vec<EntityId>,
    /// Markers that started a new animation.
    pub animated: Vec<EntityId>,
    /// How many of those follow a routed path.
    pub routed: usize,
    pub removed: Vec<EntityId>,
    /// Markers due for removal that are still animating.
    pub deferred: Vec<EntityId>,
}

// ── Engine ────────────────────────────────────────────────────────────────────

/// Owns the position store, the marker registry, and the animation task
/// table, and keeps them consistent with the batches, frames, and viewport
/// changes it is fed.
///
/// Three clocks meet here:
///
/// 1. **Batches** ([`reconcile`](Self::reconcile) / [`refresh`](Self::refresh)):
///    create, redirect, and remove markers.
/// 2. **Frames** ([`frame`](Self::frame)): move animating markers and finish
///    their tasks.
/// 3. **Viewport** ([`set_viewport`](Self::set_viewport)): gates what is
///    tracked; takes effect on the next frame or batch.
///
/// Markers that should disappear while animating are not removed at once;
/// they are parked in a pending-removal set and removed when their task
/// ends.
///
/// Create via [`EngineBuilder`][crate::EngineBuilder].
pub struct Engine {
    pub(crate) config:          EngineConfig,
    pub(crate) viewport:        Viewport,
    pub(crate) store:           PositionStore,
    pub(crate) markers:         MarkerRegistry,
    pub(crate) scheduler:       AnimationScheduler,
    pub(crate) pending_removal: BTreeSet<EntityId>,
    pub(crate) cache:           ViewportCache,
    pub(crate) resolver:        Option<RouteResolver>,
    pub(crate) cadence:         RefreshCadence,
    pub(crate) log:             DynLog,
}

impl Engine {
    // ── Batches ───────────────────────────────────────────────────────────

    /// Apply one snapshot batch.
    ///
    /// Per entity, in batch order: store the snapshot, then
    ///
    /// - in view, no marker → create one at the snapshot position;
    /// - in view, marker moved more than `min_move_m` since its last
    ///   accepted snapshot → animate from the displayed position to the new
    ///   one, following a road path when the resolver provides one;
    /// - out of view, marker → remove it (deferred while animating).
    ///
    /// Afterwards every marker whose entity is missing from the batch, or
    /// whose displayed position is outside the viewport, is removed under
    /// the same deferral rule.
    pub async fn reconcile<S: MarkerSink>(
        &mut self,
        batch: &[EntitySnapshot],
        now:   FrameTime,
        sink:  &mut S,
    ) -> ReconcileReport {
        let mut report = ReconcileReport::default();

        for snapshot in batch {
            self.apply_snapshot(snapshot, now, sink, &mut report).await;
        }
        self.sweep(batch, sink, &mut report);

        tracing::debug!(
            entities = batch.len(),
            added    = report.added.len(),
            animated = report.animated.len(),
            routed   = report.routed,
            removed  = report.removed.len(),
            deferred = report.deferred.len(),
            "batch reconciled"
        );
        report
    }

    /// Fetch entities for the current viewport through the cache and
    /// reconcile them.
    ///
    /// Below `min_zoom_for_fetch` nothing is fetched, a `skipped` event is
    /// logged, and `None` is returned.  `force` ignores a fresh cache entry.
    pub async fn refresh<S: MarkerSink>(
        &mut self,
        now:   FrameTime,
        force: bool,
        sink:  &mut S,
    ) -> Option<ReconcileReport> {
        let viewport = self.viewport;
        if viewport.zoom < self.config.min_zoom_for_fetch {
            self.log.record(
                EventKind::Skipped,
                &format!(
                    "zoom {} below {}, not fetching",
                    viewport.zoom, self.config.min_zoom_for_fetch
                ),
            );
            return None;
        }

        let entities = if force {
            self.cache.refresh(&viewport).await
        } else {
            self.cache.resolve(&viewport).await
        };
        self.cadence.observe(entities.len());
        Some(self.reconcile(&entities, now, sink).await)
    }

    // ── Frames ────────────────────────────────────────────────────────────

    /// Advance every animation to `now`, mirror moved positions to `sink`,
    /// and finish ended tasks (clearing routes and carrying out deferred
    /// removals).
    pub fn frame<S: MarkerSink>(&mut self, now: FrameTime, sink: &mut S) -> FrameReport {
        let report = self.scheduler.advance(now, &self.viewport, &mut self.markers);
        for (id, position) in &report.moved {
            sink.set_position(id, *position);
        }
        for (id, outcome) in &report.finished {
            self.finish(id, *outcome, sink);
        }
        report
    }

    /// Start an animation for an existing marker directly, bypassing the
    /// movement threshold and the resolver.
    pub fn animate<S: MarkerSink>(
        &mut self,
        id:          &EntityId,
        points:      Vec<GeoPoint>,
        duration_ms: f64,
        on_complete: Option<OnComplete>,
        sink:        &mut S,
    ) -> TaskStart {
        let before = self.markers.get(id).map(|m| m.displayed);
        let start = self.scheduler.animate(
            &mut self.markers,
            id,
            points,
            duration_ms,
            &self.viewport,
            on_complete,
        );
        if let (TaskStart::Completed(outcome), Some(before)) = (start, before) {
            self.finish_immediately(id, before, outcome, sink);
        }
        start
    }

    // ── Viewport & pointer ────────────────────────────────────────────────

    pub fn set_viewport(&mut self, viewport: Viewport) {
        tracing::debug!(bounds = %viewport.bounds, zoom = viewport.zoom, "viewport changed");
        self.viewport = viewport;
    }

    /// Pointer entered the marker: freeze its animation.
    pub fn pointer_enter(&mut self, id: &EntityId) -> EngineResult<()> {
        Ok(self.markers.set_hovered(id, true)?)
    }

    /// Pointer left the marker: resume from where it froze.
    pub fn pointer_leave(&mut self, id: &EntityId) -> EngineResult<()> {
        Ok(self.markers.set_hovered(id, false)?)
    }

    // ── Queries ───────────────────────────────────────────────────────────

    #[inline]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[inline]
    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    #[inline]
    pub fn store(&self) -> &PositionStore {
        &self.store
    }

    #[inline]
    pub fn markers(&self) -> &MarkerRegistry {
        &self.markers
    }

    pub fn marker(&self, id: &EntityId) -> Option<&TrackedMarker> {
        self.markers.get(id)
    }

    #[inline]
    pub fn scheduler(&self) -> &AnimationScheduler {
        &self.scheduler
    }

    #[inline]
    pub fn cadence(&self) -> &RefreshCadence {
        &self.cadence
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn is_pending_removal(&self, id: &EntityId) -> bool {
        self.pending_removal.contains(id)
    }

    // ── Internals ─────────────────────────────────────────────────────────

    async fn apply_snapshot<S: MarkerSink>(
        &mut self,
        snapshot: &EntitySnapshot,
        now:      FrameTime,
        sink:     &mut S,
        report:   &mut ReconcileReport,
    ) {
        let id = snapshot.id().clone();
        let position = snapshot.position();
        self.store.upsert(snapshot.clone());
        let in_view = self.viewport.contains(position);

        let Some(marker) = self.markers.get(&id) else {
            if in_view {
                self.markers.insert(id.clone(), position);
                self.store.mark_moved(&id, now);
                sink.add(&id, position, snapshot);
                report.added.push(id);
            }
            return;
        };

        if !in_view {
            if marker.is_animating() {
                if self.pending_removal.insert(id.clone()) {
                    report.deferred.push(id);
                }
            } else {
                self.remove_marker(&id, sink);
                report.removed.push(id);
            }
            return;
        }

        let moved_m = marker.snapshot_position.distance_m(position);
        let from = marker.displayed;
        self.pending_removal.remove(&id);
        if moved_m <= self.config.min_move_m {
            return;
        }
        self.move_marker(&id, from, snapshot, now, sink, report).await;
    }

    /// Redirect `id` from its displayed position `from` to the snapshot's
    /// position.
    async fn move_marker<S: MarkerSink>(
        &mut self,
        id:       &EntityId,
        from:     GeoPoint,
        snapshot: &EntitySnapshot,
        now:      FrameTime,
        sink:     &mut S,
        report:   &mut ReconcileReport,
    ) {
        let to = snapshot.position();
        let mut duration_ms = match self.store.last_moved_at(id) {
            Some(previous) => now.since(previous),
            None => self.config.default_animation_ms,
        };

        let mut path = vec![from, to];
        let mut routed = false;
        if let Some(resolver) = &self.resolver {
            if resolver.should_route(self.viewport.zoom, from, to) {
                if let Some(route) = resolver.route(from, to).await {
                    duration_ms = duration_ms.max(route.duration_ms);
                    path = route.points;
                    if path.first() != Some(&from) {
                        path.insert(0, from);
                    }
                    routed = true;
                }
            }
        }

        self.store.mark_moved(id, now);
        if let Some(marker) = self.markers.get_mut(id) {
            marker.snapshot_position = to;
            if marker.route_shown {
                marker.route_shown = false;
                sink.clear_route(id);
            }
            if routed {
                marker.route_shown = true;
                sink.show_route(id, &path);
            }
        }
        sink.set_content(id, snapshot);

        report.animated.push(id.clone());
        if routed {
            report.routed += 1;
        }

        let start = self.scheduler.animate(
            &mut self.markers,
            id,
            path,
            duration_ms,
            &self.viewport,
            None,
        );
        if let TaskStart::Completed(outcome) = start {
            self.finish_immediately(id, from, outcome, sink);
        }
    }

    fn sweep<S: MarkerSink>(
        &mut self,
        batch:  &[EntitySnapshot],
        sink:   &mut S,
        report: &mut ReconcileReport,
    ) {
        let present: IdSet<'_> = batch.iter().map(EntitySnapshot::id).collect();

        let stale: Vec<EntityId> = self
            .markers
            .iter()
            // Batch members were settled by `apply_snapshot` against their
            // snapshot position; a marker mid-flight outside the viewport
            // still belongs to an in-view entity.
            .filter(|m| !present.contains(&m.id))
            .map(|m| m.id.clone())
            .collect();

        for id in stale {
            if self.markers.get(&id).is_some_and(TrackedMarker::is_animating) {
                if self.pending_removal.insert(id.clone()) {
                    report.deferred.push(id);
                }
            } else {
                self.remove_marker(&id, sink);
                report.removed.push(id);
            }
        }

        let markers = &self.markers;
        self.store.retain(|id| present.contains(id) || markers.contains(id));
    }

    /// A task that ended inside `animate` may have moved the marker away
    /// from `before` without a frame; mirror that before the usual
    /// completion handling.
    fn finish_immediately<S: MarkerSink>(
        &mut self,
        id:      &EntityId,
        before:  GeoPoint,
        outcome: TaskOutcome,
        sink:    &mut S,
    ) {
        if let Some(marker) = self.markers.get(id) {
            if marker.displayed != before {
                sink.set_position(id, marker.displayed);
            }
        }
        self.finish(id, outcome, sink);
    }

    fn finish<S: MarkerSink>(&mut self, id: &EntityId, outcome: TaskOutcome, sink: &mut S) {
        let Some(marker) = self.markers.get_mut(id) else {
            self.pending_removal.remove(id);
            return;
        };
        if marker.route_shown {
            marker.route_shown = false;
            sink.clear_route(id);
        }
        let outside = !self.viewport.contains(marker.displayed);
        sink.on_animation_end(id, outcome);

        if self.pending_removal.remove(id) || outside {
            self.remove_marker(id, sink);
        }
    }

    fn remove_marker<S: MarkerSink>(&mut self, id: &EntityId, sink: &mut S) {
        self.scheduler.cancel(id, &mut self.markers);
        self.pending_removal.remove(id);
        if let Some(marker) = self.markers.remove(id) {
            if marker.route_shown {
                sink.clear_route(id);
            }
            sink.remove(id);
        }
    }
}
