//! Unit tests for lm-engine.
//!
//! Frames are simulated with explicit `FrameTime`s; async tests run on a
//! paused tokio clock so cache TTLs are exact.

#[cfg(test)]
mod helpers {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    use lm_core::{
        Bounds, EngineConfig, EntityAttributes, EntityId, EntitySnapshot, EventKind, EventLog,
        GeoPoint, SourceError, Viewport,
    };
    use lm_feed::EntitySource;
    use lm_spatial::{Route, RouteError, RouteResult, RouteSource};

    use crate::{Engine, EngineBuilder};

    pub const A: GeoPoint = GeoPoint { lat: 51.5000, lon: -0.1000 };
    /// ≈ 100 m north of `A`.
    pub const B: GeoPoint = GeoPoint { lat: 51.5009, lon: -0.1000 };
    /// ≈ 300 m north of `A`.
    pub const C: GeoPoint = GeoPoint { lat: 51.5027, lon: -0.1000 };
    pub const PARIS: GeoPoint = GeoPoint { lat: 48.8566, lon: 2.3522 };

    pub fn id(s: &str) -> EntityId {
        EntityId::new(s)
    }

    pub fn snap(s: &str, p: GeoPoint) -> EntitySnapshot {
        let attrs = EntityAttributes {
            line:        "X4".into(),
            operator:    "FBRI".into(),
            destination: "Temple_Meads".into(),
            ..EntityAttributes::default()
        };
        EntitySnapshot::new(s, p, attrs).unwrap()
    }

    pub fn london(zoom: u8) -> Viewport {
        Viewport::new(Bounds::new(-0.2, 51.4, 0.0, 51.6).unwrap(), zoom)
    }

    pub fn paris() -> Viewport {
        Viewport::new(Bounds::new(2.2, 48.8, 2.5, 48.9).unwrap(), 15)
    }

    pub fn close(a: GeoPoint, b: GeoPoint) -> bool {
        (a.lat - b.lat).abs() < 1e-9 && (a.lon - b.lon).abs() < 1e-9
    }

    pub fn engine(viewport: Viewport) -> Engine {
        EngineBuilder::new(EngineConfig::default(), viewport)
            .log(Arc::new(CaptureLog::default()))
            .build()
            .unwrap()
    }

    #[derive(Default)]
    pub struct CaptureLog {
        pub events: Mutex<Vec<(EventKind, String)>>,
    }

    impl CaptureLog {
        pub fn kinds(&self) -> Vec<EventKind> {
            self.events.lock().unwrap().iter().map(|(k, _)| *k).collect()
        }
    }

    impl EventLog for CaptureLog {
        fn record(&self, kind: EventKind, message: &str) {
            self.events.lock().unwrap().push((kind, message.to_string()));
        }
    }

    /// Returns a fixed batch and counts fetches.
    #[derive(Default)]
    pub struct CountingSource {
        pub calls:    AtomicUsize,
        pub entities: Vec<EntitySnapshot>,
    }

    impl CountingSource {
        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl EntitySource for CountingSource {
        async fn fetch(&self, bounds: Bounds) -> Result<Vec<EntitySnapshot>, SourceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.entities.iter().filter(|e| bounds.contains(e.position())).cloned().collect())
        }
    }

    /// Answers every request with `reply` (or a network failure when `None`).
    pub struct ScriptedRouter {
        pub reply: Option<Route>,
        pub calls: AtomicUsize,
    }

    impl ScriptedRouter {
        pub fn new(reply: Option<Route>) -> Self {
            Self { reply, calls: AtomicUsize::new(0) }
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl RouteSource for ScriptedRouter {
        async fn route(&self, _from: GeoPoint, _to: GeoPoint) -> RouteResult<Route> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.reply {
                Some(route) => Ok(route.clone()),
                None => Err(RouteError::Source(SourceError::Network("connection refused".into()))),
            }
        }
    }
}

// ── PositionStore ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod store {
    use lm_core::FrameTime;

    use super::helpers::{id, snap, A, B};
    use crate::PositionStore;

    #[test]
    fn newer_snapshot_replaces_older() {
        let mut store = PositionStore::new();
        assert!(store.upsert(snap("bus-1", A)).is_none());
        let old = store.upsert(snap("bus-1", B)).unwrap();
        assert_eq!(old.position(), A);
        assert_eq!(store.snapshot(&id("bus-1")).unwrap().position(), B);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn upsert_keeps_movement_baseline() {
        let mut store = PositionStore::new();
        store.upsert(snap("bus-1", A));
        store.mark_moved(&id("bus-1"), FrameTime(1_000.0));
        store.upsert(snap("bus-1", B));
        assert_eq!(store.last_moved_at(&id("bus-1")), Some(FrameTime(1_000.0)));
    }

    #[test]
    fn retain_prunes() {
        let mut store = PositionStore::new();
        store.upsert(snap("a", A));
        store.upsert(snap("b", A));
        store.retain(|i| i.as_str() == "b");
        assert!(!store.contains(&id("a")));
        assert!(store.contains(&id("b")));
    }
}

// ── RefreshCadence ────────────────────────────────────────────────────────────

#[cfg(test)]
mod cadence {
    use lm_core::EngineConfig;

    use crate::RefreshCadence;

    #[test]
    fn hysteresis_between_thresholds() {
        let config = EngineConfig::default();
        let mut cadence = RefreshCadence::new(&config);
        assert_eq!(cadence.interval_ms(), 30_000);

        assert!(!cadence.observe(800));
        assert!(!cadence.is_scenic());

        assert!(cadence.observe(1_200));
        assert_eq!(cadence.interval_ms(), 20_000);

        // Between exit (500) and enter (1000): stays scenic.
        assert!(!cadence.observe(700));
        assert!(cadence.is_scenic());

        assert!(cadence.observe(400));
        assert_eq!(cadence.interval_ms(), 30_000);
    }
}

// ── EngineBuilder ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod builder {
    use lm_core::EngineConfig;

    use super::helpers::london;
    use crate::{EngineBuilder, EngineError};

    #[test]
    fn invalid_config_is_rejected() {
        let config = EngineConfig { tile_size_degrees: 0.0, ..EngineConfig::default() };
        let err = EngineBuilder::new(config, london(15)).build().err().unwrap();
        assert!(matches!(err, EngineError::Config(_)));
    }

    #[test]
    fn starts_empty() {
        let engine = EngineBuilder::new(EngineConfig::default(), london(15)).build().unwrap();
        assert!(engine.markers().is_empty());
        assert!(engine.store().is_empty());
        assert!(engine.scheduler().is_idle());
    }
}

// ── Reconcile ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod reconcile {
    use lm_anim::TaskOutcome;
    use lm_core::{FrameTime, GeoPoint};

    use super::helpers::{close, engine, id, london, snap, A, B, PARIS};
    use crate::{RecordingSink, SinkEvent};

    #[tokio::test]
    async fn new_in_view_entity_gets_marker() {
        let mut eng = engine(london(15));
        let mut sink = RecordingSink::new();
        let r = eng.reconcile(&[snap("bus-1", A)], FrameTime(0.0), &mut sink).await;

        assert_eq!(r.added, vec![id("bus-1")]);
        assert_eq!(sink.events, vec![SinkEvent::Added { id: id("bus-1"), position: A }]);
        assert_eq!(eng.marker(&id("bus-1")).unwrap().displayed, A);
    }

    #[tokio::test]
    async fn out_of_view_entity_gets_no_marker() {
        let mut eng = engine(london(15));
        let mut sink = RecordingSink::new();
        let r = eng.reconcile(&[snap("bus-9", PARIS)], FrameTime(0.0), &mut sink).await;

        assert!(r.added.is_empty());
        assert!(sink.events.is_empty());
        assert!(eng.marker(&id("bus-9")).is_none());
        assert!(eng.store().contains(&id("bus-9")));
    }

    #[tokio::test]
    async fn move_animates_and_lands_exactly() {
        let mut eng = engine(london(15));
        let mut sink = RecordingSink::new();
        eng.reconcile(&[snap("bus-1", A)], FrameTime(0.0), &mut sink).await;
        sink.take();

        let r = eng.reconcile(&[snap("bus-1", B)], FrameTime(5_000.0), &mut sink).await;
        assert_eq!(r.animated, vec![id("bus-1")]);
        assert_eq!(r.routed, 0);
        assert_eq!(sink.take(), vec![SinkEvent::Content(id("bus-1"))]);

        // Duration is the spacing between accepted updates.
        let task = eng.scheduler().task(&id("bus-1")).unwrap();
        assert_eq!(task.duration_ms(), 5_000.0);
        assert_eq!(task.path().points(), &[A, B]);

        eng.frame(FrameTime(5_000.0), &mut sink);
        eng.frame(FrameTime(7_500.0), &mut sink);
        assert!(close(eng.marker(&id("bus-1")).unwrap().displayed, A.lerp(B, 0.5)));

        eng.frame(FrameTime(10_000.0), &mut sink);
        let marker = eng.marker(&id("bus-1")).unwrap();
        assert_eq!(marker.displayed, B);
        assert!(!marker.is_animating());
        assert_eq!(
            sink.count(|e| matches!(e, SinkEvent::AnimationEnd { outcome: TaskOutcome::Finished, .. })),
            1
        );

        // Idempotent snap: later frames change nothing.
        sink.take();
        let report = eng.frame(FrameTime(12_000.0), &mut sink);
        assert!(report.is_empty());
        assert!(sink.events.is_empty());
    }

    #[tokio::test]
    async fn jitter_below_threshold_is_ignored() {
        let mut eng = engine(london(15));
        let mut sink = RecordingSink::new();
        eng.reconcile(&[snap("bus-1", A)], FrameTime(0.0), &mut sink).await;
        sink.take();

        let jitter = GeoPoint::new(A.lat + 0.000_03, A.lon); // ≈ 3 m
        let r = eng.reconcile(&[snap("bus-1", jitter)], FrameTime(1_000.0), &mut sink).await;
        assert!(r.animated.is_empty());
        assert!(sink.events.is_empty());
        assert_eq!(eng.marker(&id("bus-1")).unwrap().displayed, A);
        assert_eq!(eng.store().snapshot(&id("bus-1")).unwrap().position(), jitter);
    }

    #[tokio::test]
    async fn redirect_starts_from_displayed_position() {
        let mut eng = engine(london(15));
        let mut sink = RecordingSink::new();
        eng.reconcile(&[snap("bus-1", A)], FrameTime(0.0), &mut sink).await;
        eng.reconcile(&[snap("bus-1", B)], FrameTime(1_000.0), &mut sink).await;
        eng.frame(FrameTime(1_000.0), &mut sink);
        eng.frame(FrameTime(1_500.0), &mut sink);
        let midway = eng.marker(&id("bus-1")).unwrap().displayed;

        let c = GeoPoint::new(B.lat, B.lon + 0.002);
        eng.reconcile(&[snap("bus-1", c)], FrameTime(1_500.0), &mut sink).await;
        let task = eng.scheduler().task(&id("bus-1")).unwrap();
        assert_eq!(task.path().points(), &[midway, c]);
        assert_eq!(task.duration_ms(), 500.0);
        assert_eq!(eng.scheduler().active_count(), 1);

        // The superseded task never reports an end.
        eng.frame(FrameTime(1_500.0), &mut sink);
        eng.frame(FrameTime(2_000.0), &mut sink);
        assert_eq!(eng.marker(&id("bus-1")).unwrap().displayed, c);
        assert_eq!(sink.count(|e| matches!(e, SinkEvent::AnimationEnd { .. })), 1);
    }

    #[tokio::test]
    async fn missing_idle_marker_is_swept() {
        let mut eng = engine(london(15));
        let mut sink = RecordingSink::new();
        eng.reconcile(&[snap("bus-1", A), snap("bus-2", B)], FrameTime(0.0), &mut sink).await;

        let r = eng.reconcile(&[snap("bus-2", B)], FrameTime(1_000.0), &mut sink).await;
        assert_eq!(r.removed, vec![id("bus-1")]);
        assert!(eng.marker(&id("bus-1")).is_none());
        assert!(!eng.store().contains(&id("bus-1")));
        assert!(sink.events.contains(&SinkEvent::Removed(id("bus-1"))));
    }

    #[tokio::test]
    async fn idle_marker_leaving_view_is_removed() {
        let mut eng = engine(london(15));
        let mut sink = RecordingSink::new();
        eng.reconcile(&[snap("bus-1", A)], FrameTime(0.0), &mut sink).await;

        let r = eng.reconcile(&[snap("bus-1", PARIS)], FrameTime(1_000.0), &mut sink).await;
        assert_eq!(r.removed, vec![id("bus-1")]);
        assert!(eng.markers().is_empty());
        // The snapshot is still known.
        assert_eq!(eng.store().snapshot(&id("bus-1")).unwrap().position(), PARIS);
    }
}

// ── Deferred removal ──────────────────────────────────────────────────────────

#[cfg(test)]
mod deferral {
    use lm_anim::TaskOutcome;
    use lm_core::{Bounds, FrameTime, Viewport};

    use super::helpers::{engine, id, london, paris, snap, A, B, PARIS};
    use crate::{RecordingSink, SinkEvent};

    #[tokio::test]
    async fn animating_marker_out_of_new_viewport_waits_for_completion() {
        let mut eng = engine(london(15));
        let mut sink = RecordingSink::new();
        eng.reconcile(&[snap("bus-1", A)], FrameTime(0.0), &mut sink).await;
        eng.reconcile(&[snap("bus-1", B)], FrameTime(2_000.0), &mut sink).await;
        eng.frame(FrameTime(2_000.0), &mut sink);
        eng.frame(FrameTime(2_500.0), &mut sink);

        eng.set_viewport(paris());
        let r = eng.reconcile(&[snap("bus-1", B)], FrameTime(2_600.0), &mut sink).await;
        assert_eq!(r.deferred, vec![id("bus-1")]);
        assert!(r.removed.is_empty());
        assert!(eng.marker(&id("bus-1")).is_some());
        assert!(eng.is_pending_removal(&id("bus-1")));

        // Next frame: the task sees the marker outside, snaps, and only then
        // is the marker removed.
        eng.frame(FrameTime(2_616.0), &mut sink);
        assert!(eng.marker(&id("bus-1")).is_none());
        assert!(!eng.is_pending_removal(&id("bus-1")));

        let tail: Vec<_> = sink.events.iter().rev().take(3).cloned().collect();
        assert_eq!(
            tail,
            vec![
                SinkEvent::Removed(id("bus-1")),
                SinkEvent::AnimationEnd { id: id("bus-1"), outcome: TaskOutcome::LeftViewport },
                SinkEvent::Moved { id: id("bus-1"), position: B },
            ]
        );
    }

    #[tokio::test]
    async fn animating_marker_missing_from_batch_waits_for_completion() {
        let mut eng = engine(london(15));
        let mut sink = RecordingSink::new();
        eng.reconcile(&[snap("bus-1", A)], FrameTime(0.0), &mut sink).await;
        eng.reconcile(&[snap("bus-1", B)], FrameTime(1_000.0), &mut sink).await;
        eng.frame(FrameTime(1_000.0), &mut sink);

        let r = eng.reconcile(&[], FrameTime(1_200.0), &mut sink).await;
        assert_eq!(r.deferred, vec![id("bus-1")]);
        assert!(eng.marker(&id("bus-1")).is_some());

        eng.frame(FrameTime(1_500.0), &mut sink);
        assert!(eng.marker(&id("bus-1")).is_some());

        eng.frame(FrameTime(2_000.0), &mut sink);
        assert!(eng.marker(&id("bus-1")).is_none());
        assert_eq!(eng.markers().len(), 0);
    }

    #[tokio::test]
    async fn deferral_is_cancelled_when_entity_returns() {
        let mut eng = engine(london(15));
        let mut sink = RecordingSink::new();
        eng.reconcile(&[snap("bus-1", A)], FrameTime(0.0), &mut sink).await;
        eng.reconcile(&[snap("bus-1", B)], FrameTime(1_000.0), &mut sink).await;
        eng.frame(FrameTime(1_000.0), &mut sink);

        eng.reconcile(&[], FrameTime(1_100.0), &mut sink).await;
        assert!(eng.is_pending_removal(&id("bus-1")));
        eng.reconcile(&[snap("bus-1", B)], FrameTime(1_200.0), &mut sink).await;
        assert!(!eng.is_pending_removal(&id("bus-1")));

        eng.frame(FrameTime(2_000.0), &mut sink);
        assert_eq!(eng.marker(&id("bus-1")).unwrap().displayed, B);
    }

    #[tokio::test]
    async fn out_of_view_entity_with_animating_marker_is_deferred() {
        let mut eng = engine(london(15));
        let mut sink = RecordingSink::new();
        eng.reconcile(&[snap("bus-1", A)], FrameTime(0.0), &mut sink).await;
        eng.reconcile(&[snap("bus-1", B)], FrameTime(1_000.0), &mut sink).await;

        let r = eng.reconcile(&[snap("bus-1", PARIS)], FrameTime(1_100.0), &mut sink).await;
        assert_eq!(r.deferred, vec![id("bus-1")]);
        assert!(eng.marker(&id("bus-1")).unwrap().is_animating());
    }

    #[tokio::test]
    async fn in_view_entity_keeps_marker_animating_outside_viewport() {
        let mut eng = engine(london(15));
        let mut sink = RecordingSink::new();
        eng.reconcile(&[snap("bus-1", A)], FrameTime(0.0), &mut sink).await;
        eng.reconcile(&[snap("bus-1", B)], FrameTime(2_000.0), &mut sink).await;
        eng.frame(FrameTime(2_000.0), &mut sink);
        eng.frame(FrameTime(3_000.0), &mut sink);

        // Covers B but not the halfway point the marker is drawn at.
        eng.set_viewport(Viewport::new(Bounds::new(-0.2, 51.5006, 0.0, 51.6).unwrap(), 15));
        let r = eng.reconcile(&[snap("bus-1", B)], FrameTime(3_100.0), &mut sink).await;
        assert!(r.deferred.is_empty());
        assert!(r.removed.is_empty());
        assert!(!eng.is_pending_removal(&id("bus-1")));

        eng.frame(FrameTime(3_116.0), &mut sink);
        let marker = eng.marker(&id("bus-1")).expect("in-view entity lost its marker");
        assert_eq!(marker.displayed, B);
        assert!(!marker.is_animating());
        assert_eq!(sink.count(|e| matches!(e, SinkEvent::Removed(_))), 0);
    }
}

// ── Routing ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod routing {
    use std::sync::Arc;

    use lm_core::{EngineConfig, FrameTime, GeoPoint};
    use lm_spatial::Route;

    use super::helpers::{id, london, snap, CaptureLog, ScriptedRouter, A, C};
    use crate::{Engine, EngineBuilder, RecordingSink, SinkEvent};

    fn routed_engine(router: Arc<ScriptedRouter>, zoom: u8) -> Engine {
        EngineBuilder::new(EngineConfig::default(), london(zoom))
            .router(router)
            .log(Arc::new(CaptureLog::default()))
            .build()
            .unwrap()
    }

    fn dogleg() -> Route {
        Route {
            points:      vec![A, GeoPoint::new(A.lat, A.lon + 0.002), GeoPoint::new(C.lat, A.lon + 0.002), C],
            duration_ms: 20_000.0,
            distance_m:  580.0,
            road_name:   Some("Whitehall".into()),
        }
    }

    #[tokio::test]
    async fn failed_route_falls_back_to_straight_line() {
        let router = Arc::new(ScriptedRouter::new(None));
        let mut eng = routed_engine(Arc::clone(&router), 17);
        let mut sink = RecordingSink::new();
        eng.reconcile(&[snap("bus-1", A)], FrameTime(0.0), &mut sink).await;
        let r = eng.reconcile(&[snap("bus-1", C)], FrameTime(4_000.0), &mut sink).await;

        assert_eq!(router.calls(), 1);
        assert_eq!(r.routed, 0);
        let task = eng.scheduler().task(&id("bus-1")).unwrap();
        assert_eq!(task.path().points(), &[A, C]);
        assert_eq!(task.duration_ms(), 4_000.0);
        assert_eq!(sink.count(|e| matches!(e, SinkEvent::RouteShown { .. })), 0);
    }

    #[tokio::test]
    async fn routed_path_uses_longer_duration_and_shows_route() {
        let router = Arc::new(ScriptedRouter::new(Some(dogleg())));
        let mut eng = routed_engine(Arc::clone(&router), 17);
        let mut sink = RecordingSink::new();
        eng.reconcile(&[snap("bus-1", A)], FrameTime(0.0), &mut sink).await;
        let r = eng.reconcile(&[snap("bus-1", C)], FrameTime(4_000.0), &mut sink).await;

        assert_eq!(r.routed, 1);
        let task = eng.scheduler().task(&id("bus-1")).unwrap();
        assert_eq!(task.path().len(), 4);
        assert_eq!(task.duration_ms(), 20_000.0);
        assert!(sink.events.contains(&SinkEvent::RouteShown { id: id("bus-1"), points: 4 }));
        assert!(eng.marker(&id("bus-1")).unwrap().route_shown);

        eng.frame(FrameTime(4_000.0), &mut sink);
        eng.frame(FrameTime(24_000.0), &mut sink);
        assert_eq!(eng.marker(&id("bus-1")).unwrap().displayed, C);
        assert!(!eng.marker(&id("bus-1")).unwrap().route_shown);
        assert!(sink.events.contains(&SinkEvent::RouteCleared(id("bus-1"))));
    }

    #[tokio::test]
    async fn routed_path_is_anchored_at_displayed_position() {
        let mut route = dogleg();
        route.points.remove(0);
        let router = Arc::new(ScriptedRouter::new(Some(route)));
        let mut eng = routed_engine(router, 17);
        let mut sink = RecordingSink::new();
        eng.reconcile(&[snap("bus-1", A)], FrameTime(0.0), &mut sink).await;
        eng.reconcile(&[snap("bus-1", C)], FrameTime(4_000.0), &mut sink).await;

        let task = eng.scheduler().task(&id("bus-1")).unwrap();
        assert_eq!(task.path().start(), A);
        assert_eq!(task.path().len(), 4);
    }

    #[tokio::test]
    async fn below_routing_zoom_never_asks() {
        let router = Arc::new(ScriptedRouter::new(Some(dogleg())));
        let mut eng = routed_engine(Arc::clone(&router), 15);
        let mut sink = RecordingSink::new();
        eng.reconcile(&[snap("bus-1", A)], FrameTime(0.0), &mut sink).await;
        eng.reconcile(&[snap("bus-1", C)], FrameTime(4_000.0), &mut sink).await;

        assert_eq!(router.calls(), 0);
        assert_eq!(eng.scheduler().task(&id("bus-1")).unwrap().path().len(), 2);
    }
}

// ── Hover pause ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod hover {
    use lm_anim::MarkerState;
    use lm_core::FrameTime;

    use super::helpers::{close, engine, id, london, snap, A, B};
    use crate::{EngineError, RecordingSink};

    #[tokio::test]
    async fn hover_freezes_and_resumes_from_same_fraction() {
        let mut eng = engine(london(15));
        let mut sink = RecordingSink::new();
        eng.reconcile(&[snap("bus-1", A)], FrameTime(0.0), &mut sink).await;
        eng.reconcile(&[snap("bus-1", B)], FrameTime(1_000.0), &mut sink).await;
        eng.frame(FrameTime(1_000.0), &mut sink);
        eng.frame(FrameTime(1_300.0), &mut sink);
        let frozen = eng.marker(&id("bus-1")).unwrap().displayed;
        assert!(close(frozen, A.lerp(B, 0.3)));

        eng.pointer_enter(&id("bus-1")).unwrap();
        assert_eq!(eng.marker(&id("bus-1")).unwrap().state(), MarkerState::Paused);
        eng.frame(FrameTime(1_800.0), &mut sink);
        eng.frame(FrameTime(9_000.0), &mut sink);
        assert_eq!(eng.marker(&id("bus-1")).unwrap().displayed, frozen);

        eng.pointer_leave(&id("bus-1")).unwrap();
        eng.frame(FrameTime(9_200.0), &mut sink);
        assert!(close(eng.marker(&id("bus-1")).unwrap().displayed, A.lerp(B, 0.5)));
    }

    #[test]
    fn unknown_marker_is_error() {
        let mut eng = engine(london(15));
        assert!(matches!(eng.pointer_enter(&id("ghost")), Err(EngineError::Marker(_))));
    }
}

// ── Refresh ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod refresh {
    use std::sync::Arc;

    use lm_core::{EngineConfig, EventKind, FrameTime};

    use super::helpers::{id, london, snap, CaptureLog, CountingSource, A, B};
    use crate::{EngineBuilder, NoopSink, RecordingSink};

    fn source() -> Arc<CountingSource> {
        Arc::new(CountingSource {
            entities: vec![snap("bus-1", A), snap("bus-2", B)],
            ..CountingSource::default()
        })
    }

    #[tokio::test(start_paused = true)]
    async fn low_zoom_is_skipped() {
        let src = source();
        let log = Arc::new(CaptureLog::default());
        let mut eng = EngineBuilder::new(EngineConfig::default(), london(12))
            .source(src.clone())
            .log(log.clone())
            .build()
            .unwrap();

        assert!(eng.refresh(FrameTime(0.0), false, &mut NoopSink).await.is_none());
        assert_eq!(src.calls(), 0);
        assert_eq!(log.kinds(), vec![EventKind::Skipped]);
    }

    #[tokio::test(start_paused = true)]
    async fn refresh_reconciles_through_cache() {
        let src = source();
        let mut eng = EngineBuilder::new(EngineConfig::default(), london(15))
            .source(src.clone())
            .log(Arc::new(CaptureLog::default()))
            .build()
            .unwrap();
        let mut sink = RecordingSink::new();

        let r = eng.refresh(FrameTime(0.0), false, &mut sink).await.unwrap();
        assert_eq!(r.added, vec![id("bus-1"), id("bus-2")]);

        // Within the TTL the same quantized viewport is served from cache.
        let again = eng.refresh(FrameTime(100.0), false, &mut sink).await.unwrap();
        assert!(again.added.is_empty());
        assert_eq!(src.calls(), 1);
        assert_eq!(eng.cache_stats().entries, 1);

        // Forcing goes back to the source.
        eng.refresh(FrameTime(200.0), true, &mut sink).await;
        assert_eq!(src.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn expired_entry_is_refetched() {
        let src = source();
        let mut eng = EngineBuilder::new(EngineConfig::default(), london(15))
            .source(src.clone())
            .log(Arc::new(CaptureLog::default()))
            .build()
            .unwrap();

        eng.refresh(FrameTime(0.0), false, &mut NoopSink).await;
        tokio::time::advance(std::time::Duration::from_millis(3_001)).await;
        eng.refresh(FrameTime(3_001.0), false, &mut NoopSink).await;
        assert_eq!(src.calls(), 2);
    }
}
