//! Last-known snapshot per entity.

use lm_core::{EntityId, EntitySnapshot, FrameTime};

#[cfg(feature = "fx-hash")]
pub(crate) type EntityMap<V> = rustc_hash::FxHashMap<EntityId, V>;
#[cfg(feature = "fx-hash")]
pub(crate) type IdSet<'a> = rustc_hash::FxHashSet<&'a EntityId>;

#[cfg(not(feature = "fx-hash"))]
pub(crate) type EntityMap<V> = std::collections::HashMap<EntityId, V>;
#[cfg(not(feature = "fx-hash"))]
pub(crate) type IdSet<'a> = std::collections::HashSet<&'a EntityId>;

/// One stored entity.
#[derive(Clone, Debug, PartialEq)]
pub struct StoredEntity {
    /// Most recent snapshot, whether or not it moved the marker.
    pub snapshot: EntitySnapshot,

    /// Frame time of the last update that was accepted as movement (or that
    /// created the marker).  Animation durations are measured from here.
    pub last_moved_at: Option<FrameTime>,
}

/// Entity id → last-known snapshot.
///
/// Written only by the engine's reconcile pass; a newer snapshot always
/// replaces the stored one.
#[derive(Debug, Default)]
pub struct PositionStore {
    entities: EntityMap<StoredEntity>,
}

impl PositionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `snapshot`, keeping the entity's movement baseline.  Returns the
    /// snapshot it replaced.
    pub fn upsert(&mut self, snapshot: EntitySnapshot) -> Option<EntitySnapshot> {
        match self.entities.get_mut(snapshot.id()) {
            Some(stored) => Some(std::mem::replace(&mut stored.snapshot, snapshot)),
            None => {
                self.entities.insert(
                    snapshot.id().clone(),
                    StoredEntity { snapshot, last_moved_at: None },
                );
                None
            }
        }
    }

    /// Record that the entity's latest snapshot was accepted as movement.
    pub fn mark_moved(&mut self, id: &EntityId, now: FrameTime) {
        if let Some(stored) = self.entities.get_mut(id) {
            stored.last_moved_at = Some(now);
        }
    }

    pub fn get(&self, id: &EntityId) -> Option<&StoredEntity> {
        self.entities.get(id)
    }

    pub fn snapshot(&self, id: &EntityId) -> Option<&EntitySnapshot> {
        self.entities.get(id).map(|s| &s.snapshot)
    }

    pub fn last_moved_at(&self, id: &EntityId) -> Option<FrameTime> {
        self.entities.get(id).and_then(|s| s.last_moved_at)
    }

    pub fn remove(&mut self, id: &EntityId) -> Option<StoredEntity> {
        self.entities.remove(id)
    }

    /// Keep only the entities for which `keep` returns `true`.
    pub fn retain(&mut self, mut keep: impl FnMut(&EntityId) -> bool) {
        self.entities.retain(|id, _| keep(id));
    }

    pub fn contains(&self, id: &EntityId) -> bool {
        self.entities.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}
