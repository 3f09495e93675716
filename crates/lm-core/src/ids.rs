//! Strongly typed entity identifier.
//!
//! Feed identifiers are opaque strings (`"EYMS-1234"`, ICAO hex codes, …).
//! Wrapping them keeps them from being confused with labels or operator
//! codes, and the `Ord` impl gives the scheduler a deterministic iteration
//! order.

use std::fmt;
use std::sync::Arc;

/// Stable identifier of a tracked entity.
///
/// Backed by `Arc<str>` so cloning into the position store, the marker
/// registry, and the task table is a reference-count bump.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct EntityId(Arc<str>);

impl EntityId {
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(Arc::from(id.as_ref()))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `true` for the empty string, which the wire parsers reject.
    #[inline]
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for EntityId {
    fn from(s: String) -> Self {
        Self(Arc::from(s))
    }
}

impl std::borrow::Borrow<str> for EntityId {
    fn borrow(&self) -> &str {
        &self.0
    }
}
