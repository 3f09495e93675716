//! The marker primitive the engine drives.

use lm_anim::TaskOutcome;
use lm_core::{EntityId, EntitySnapshot, GeoPoint};

/// Callbacks through which [`Engine`][crate::Engine] creates, moves, and
/// removes the markers drawn on the map.
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.  The engine owns marker membership and
/// positions; a sink only mirrors them.
///
/// # Example — counting moves
///
/// ```rust,ignore
/// struct MoveCounter(usize);
///
/// impl MarkerSink for MoveCounter {
///     fn set_position(&mut self, _id: &EntityId, _position: GeoPoint) {
///         self.0 += 1;
///     }
/// }
/// ```
pub trait MarkerSink {
    /// A marker was created for an entity that entered the viewport.
    fn add(&mut self, _id: &EntityId, _position: GeoPoint, _snapshot: &EntitySnapshot) {}

    /// The displayed position changed.
    fn set_position(&mut self, _id: &EntityId, _position: GeoPoint) {}

    /// Popup content should be rebuilt from `snapshot`.
    fn set_content(&mut self, _id: &EntityId, _snapshot: &EntitySnapshot) {}

    fn remove(&mut self, _id: &EntityId) {}

    /// Draw the road path the marker is about to follow.
    fn show_route(&mut self, _id: &EntityId, _path: &[GeoPoint]) {}

    fn clear_route(&mut self, _id: &EntityId) {}

    /// An animation ended without being superseded.
    fn on_animation_end(&mut self, _id: &EntityId, _outcome: TaskOutcome) {}
}

/// A [`MarkerSink`] that does nothing.
pub struct NoopSink;

impl MarkerSink for NoopSink {}

// ── RecordingSink ─────────────────────────────────────────────────────────────

/// One call received by a [`RecordingSink`].
#[derive(Clone, Debug, PartialEq)]
pub enum SinkEvent {
    Added { id: EntityId, position: GeoPoint },
    Moved { id: EntityId, position: GeoPoint },
    Content(EntityId),
    Removed(EntityId),
    RouteShown { id: EntityId, points: usize },
    RouteCleared(EntityId),
    AnimationEnd { id: EntityId, outcome: TaskOutcome },
}

/// Keeps every call in order.  Handy for headless replays and tests.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub events: Vec<SinkEvent>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain the recorded events.
    pub fn take(&mut self) -> Vec<SinkEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn count(&self, pred: impl Fn(&SinkEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl MarkerSink for RecordingSink {
    fn add(&mut self, id: &EntityId, position: GeoPoint, _snapshot: &EntitySnapshot) {
        self.events.push(SinkEvent::Added { id: id.clone(), position });
    }

    fn set_position(&mut self, id: &EntityId, position: GeoPoint) {
        self.events.push(SinkEvent::Moved { id: id.clone(), position });
    }

    fn set_content(&mut self, id: &EntityId, _snapshot: &EntitySnapshot) {
        self.events.push(SinkEvent::Content(id.clone()));
    }

    fn remove(&mut self, id: &EntityId) {
        self.events.push(SinkEvent::Removed(id.clone()));
    }

    fn show_route(&mut self, id: &EntityId, path: &[GeoPoint]) {
        self.events.push(SinkEvent::RouteShown { id: id.clone(), points: path.len() });
    }

    fn clear_route(&mut self, id: &EntityId) {
        self.events.push(SinkEvent::RouteCleared(id.clone()));
    }

    fn on_animation_end(&mut self, id: &EntityId, outcome: TaskOutcome) {
        self.events.push(SinkEvent::AnimationEnd { id: id.clone(), outcome });
    }
}
