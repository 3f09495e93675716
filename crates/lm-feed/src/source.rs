//! The snapshot-source port.

use std::sync::Arc;

use async_trait::async_trait;

use lm_core::{Bounds, EntitySnapshot, SourceError};

/// External collaborator that fetches the entities inside `bounds`.
///
/// One call is one network round trip as far as the engine is concerned;
/// the viewport cache decides when to make it.
///
/// # Thread safety
///
/// Implementations must be `Send + Sync` so a single source can be shared
/// between the cache and any background refresh task.
#[async_trait]
pub trait EntitySource: Send + Sync {
    async fn fetch(&self, bounds: Bounds) -> Result<Vec<EntitySnapshot>, SourceError>;
}

#[async_trait]
impl<S: EntitySource + ?Sized> EntitySource for Arc<S> {
    async fn fetch(&self, bounds: Bounds) -> Result<Vec<EntitySnapshot>, SourceError> {
        (**self).fetch(bounds).await
    }
}

/// A fixed entity set, filtered by the requested bounds.
#[derive(Clone, Debug, Default)]
pub struct StaticSource {
    entities: Vec<EntitySnapshot>,
}

impl StaticSource {
    pub fn new(entities: Vec<EntitySnapshot>) -> Self {
        Self { entities }
    }
}

#[async_trait]
impl EntitySource for StaticSource {
    async fn fetch(&self, bounds: Bounds) -> Result<Vec<EntitySnapshot>, SourceError> {
        Ok(self
            .entities
            .iter()
            .filter(|e| bounds.contains(e.position()))
            .cloned()
            .collect())
    }
}
