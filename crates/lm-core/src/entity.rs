//! Entity snapshots — one refresh cycle's reported position and attributes
//! for one tracked vehicle.

use std::collections::BTreeMap;

use crate::{CoreError, CoreResult, EntityId, GeoPoint};

/// Display attributes carried alongside a position.
///
/// `line`, `operator`, and `destination` are the fields the bus feed always
/// provides; anything else lands in `extra` for popup rendering.
#[derive(Clone, Debug, Default, PartialEq)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct EntityAttributes {
    /// Route / service label shown in the popup header (e.g. `"X4"`).
    pub line: String,
    /// Operator code; the first four characters select the marker colour.
    pub operator: String,
    pub destination: String,
    /// Feed timestamp as reported upstream (RFC 3339), if any.
    pub timestamp: Option<String>,
    #[serde(default)]
    pub extra: BTreeMap<String, String>,
}

impl EntityAttributes {
    /// Destination with the feed's underscore separators turned into spaces,
    /// or `"Unknown"` when absent.
    pub fn display_destination(&self) -> String {
        let trimmed = self.destination.trim();
        if trimmed.is_empty() {
            return "Unknown".to_string();
        }
        trimmed
            .split('_')
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// One immutable snapshot of an entity.
///
/// Constructed only through [`EntitySnapshot::new`], which rejects blank ids
/// and out-of-range coordinates, so downstream code never re-validates.
#[derive(Clone, Debug, PartialEq)]
pub struct EntitySnapshot {
    id:         EntityId,
    position:   GeoPoint,
    attributes: EntityAttributes,
}

impl EntitySnapshot {
    pub fn new(
        id: impl Into<EntityId>,
        position: GeoPoint,
        attributes: EntityAttributes,
    ) -> CoreResult<Self> {
        let id = id.into();
        if id.is_blank() {
            return Err(CoreError::Parse("entity id is blank".into()));
        }
        if !position.is_valid() {
            return Err(CoreError::Parse(format!("entity {id}: invalid position {position}")));
        }
        Ok(Self { id, position, attributes })
    }

    #[inline]
    pub fn id(&self) -> &EntityId {
        &self.id
    }

    #[inline]
    pub fn position(&self) -> GeoPoint {
        self.position
    }

    #[inline]
    pub fn attributes(&self) -> &EntityAttributes {
        &self.attributes
    }
}
