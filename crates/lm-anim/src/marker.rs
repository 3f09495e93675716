//! Tracked markers and their registry.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use lm_core::{EntityId, GeoPoint};

use crate::{AnimError, AnimResult};

/// Animation state as seen from outside.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MarkerState {
    Idle,
    Animating,
    /// Animating, but frozen because the pointer is over the marker.
    Paused,
}

/// The engine's handle on one displayed marker.
///
/// `displayed` can lag `snapshot_position` while an animation is running;
/// when idle the two are equal.
#[derive(Clone, Debug, PartialEq)]
pub struct TrackedMarker {
    pub id: EntityId,

    /// Where the marker is drawn right now.
    pub displayed: GeoPoint,

    /// Position from the snapshot that last moved this marker.  Movement
    /// thresholds compare against this, not against `displayed`.
    pub snapshot_position: GeoPoint,

    /// Pointer is over the marker; its animation (if any) is frozen.
    pub hovered: bool,

    /// A route overlay is currently drawn for this marker.
    pub route_shown: bool,

    pub(crate) animating: bool,
}

impl TrackedMarker {
    pub fn new(id: EntityId, position: GeoPoint) -> Self {
        Self {
            id,
            displayed: position,
            snapshot_position: position,
            hovered: false,
            route_shown: false,
            animating: false,
        }
    }

    #[inline]
    pub fn is_animating(&self) -> bool {
        self.animating
    }

    pub fn state(&self) -> MarkerState {
        match (self.animating, self.hovered) {
            (false, _)    => MarkerState::Idle,
            (true, false) => MarkerState::Animating,
            (true, true)  => MarkerState::Paused,
        }
    }
}

/// All markers currently displayed, keyed by entity.
///
/// Iteration is in ascending id order so frame processing and sweeps are
/// deterministic.
#[derive(Debug, Default)]
pub struct MarkerRegistry {
    markers: BTreeMap<EntityId, TrackedMarker>,
}

impl MarkerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a new marker at `position`, replacing any previous one.
    pub fn insert(&mut self, id: EntityId, position: GeoPoint) -> &mut TrackedMarker {
        let marker = TrackedMarker::new(id.clone(), position);
        match self.markers.entry(id) {
            Entry::Occupied(mut slot) => {
                slot.insert(marker);
                slot.into_mut()
            }
            Entry::Vacant(slot) => slot.insert(marker),
        }
    }

    pub fn get(&self, id: &EntityId) -> Option<&TrackedMarker> {
        self.markers.get(id)
    }

    pub fn get_mut(&mut self, id: &EntityId) -> Option<&mut TrackedMarker> {
        self.markers.get_mut(id)
    }

    pub fn remove(&mut self, id: &EntityId) -> Option<TrackedMarker> {
        self.markers.remove(id)
    }

    pub fn contains(&self, id: &EntityId) -> bool {
        self.markers.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &EntityId> + '_ {
        self.markers.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TrackedMarker> + '_ {
        self.markers.values()
    }

    /// Freeze or unfreeze the marker's animation.
    pub fn set_hovered(&mut self, id: &EntityId, hovered: bool) -> AnimResult<()> {
        let marker = self
            .markers
            .get_mut(id)
            .ok_or_else(|| AnimError::UnknownMarker(id.clone()))?;
        marker.hovered = hovered;
        Ok(())
    }
}
