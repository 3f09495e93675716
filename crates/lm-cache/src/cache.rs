//! `ViewportCache` — TTL cache with one in-flight fetch per key.
//!
//! # Design
//!
//! Pending fetches live in an in-flight map as [`Shared`] futures.  The
//! first caller for a key creates the future; every later caller for the
//! same key clones and awaits it, so identical quantized viewports share a
//! single collaborator call.  The future removes its own in-flight entry
//! through a drop guard, which also runs if the fetch is torn down early.
//!
//! Timestamps use `tokio::time::Instant` so TTL behaviour can be tested
//! with a paused clock.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt, Shared};
use tokio::time::Instant;

use lm_core::{DynLog, EngineConfig, EntitySnapshot, EventKind, Viewport};
use lm_feed::EntitySource;

use crate::CacheKey;

/// Entity list shared between the cache, pending waiters, and callers.
pub type EntityList = Arc<[EntitySnapshot]>;

type PendingFetch = Shared<BoxFuture<'static, EntityList>>;

// ── Internal state ────────────────────────────────────────────────────────────

struct Entry {
    entities:   EntityList,
    fetched_at: Instant,
}

#[derive(Default)]
struct State {
    entries:   HashMap<CacheKey, Entry>,
    in_flight: HashMap<CacheKey, PendingFetch>,
}

impl State {
    /// Drop entries older than `max_age`, then the oldest ones until at most
    /// `max_entries` remain.  Returns the number removed.
    fn evict(&mut self, now: Instant, max_entries: usize, max_age: Duration) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, e| now.duration_since(e.fetched_at) <= max_age);

        if self.entries.len() > max_entries {
            let mut by_age: Vec<(Instant, CacheKey)> =
                self.entries.iter().map(|(k, e)| (e.fetched_at, *k)).collect();
            by_age.sort_unstable();
            let excess = self.entries.len() - max_entries;
            for (_, key) in by_age.into_iter().take(excess) {
                self.entries.remove(&key);
            }
        }
        before - self.entries.len()
    }
}

fn lock(state: &Mutex<State>) -> MutexGuard<'_, State> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Clears the in-flight marker for `key` however the fetch ends.
struct PendingGuard {
    state: Arc<Mutex<State>>,
    key:   CacheKey,
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        lock(&self.state).in_flight.remove(&self.key);
    }
}

// ── CacheStats ────────────────────────────────────────────────────────────────

/// Point-in-time occupancy, for debug overlays and tests.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CacheStats {
    pub entries:     usize,
    pub in_flight:   usize,
    pub max_entries: usize,
}

// ── ViewportCache ─────────────────────────────────────────────────────────────

pub struct ViewportCache {
    source: Arc<dyn EntitySource>,
    log:    DynLog,

    grid_deg:    f64,
    max_entries: usize,
    max_age:     Duration,
    /// Source of the zoom-dependent TTL.
    config:      EngineConfig,

    state: Arc<Mutex<State>>,
}

impl ViewportCache {
    pub fn new(source: Arc<dyn EntitySource>, log: DynLog, config: &EngineConfig) -> Self {
        Self {
            source,
            log,
            grid_deg:    config.tile_size_degrees,
            max_entries: config.cache_max_entries.max(1),
            max_age:     config.cache_max_age(),
            config:      config.clone(),
            state:       Arc::new(Mutex::new(State::default())),
        }
    }

    pub fn key_for(&self, viewport: &Viewport) -> CacheKey {
        CacheKey::quantize(&viewport.bounds, self.grid_deg)
    }

    /// Entries are fresh for a shorter time when zoomed in far enough to
    /// watch individual vehicles.
    pub fn ttl_for(&self, zoom: u8) -> Duration {
        self.config.cache_ttl(zoom)
    }

    /// Entities for `viewport`, from cache when fresh.
    ///
    /// Never fails: a collaborator error is logged and yields an empty list.
    pub async fn resolve(&self, viewport: &Viewport) -> EntityList {
        self.lookup(viewport, false).await
    }

    /// Like [`resolve`](Self::resolve) but ignores a fresh entry.  A fetch
    /// already pending for the key is still joined rather than duplicated.
    pub async fn refresh(&self, viewport: &Viewport) -> EntityList {
        self.lookup(viewport, true).await
    }

    pub fn stats(&self) -> CacheStats {
        let state = lock(&self.state);
        CacheStats {
            entries:     state.entries.len(),
            in_flight:   state.in_flight.len(),
            max_entries: self.max_entries,
        }
    }

    /// Drop every stored entry.  Pending fetches are unaffected.
    pub fn clear(&self) {
        lock(&self.state).entries.clear();
    }

    async fn lookup(&self, viewport: &Viewport, force: bool) -> EntityList {
        let key = self.key_for(viewport);
        let ttl = self.ttl_for(viewport.zoom);

        let pending = {
            let mut state = lock(&self.state);

            if !force {
                if let Some(entry) = state.entries.get(&key) {
                    let age = Instant::now().duration_since(entry.fetched_at);
                    if age < ttl {
                        self.log.record(
                            EventKind::Skipped,
                            &format!("cache hit {key} ({} ms old)", age.as_millis()),
                        );
                        return Arc::clone(&entry.entities);
                    }
                }
            }

            match state.in_flight.get(&key) {
                Some(existing) => {
                    self.log.record(EventKind::Skipped, &format!("joining pending fetch {key}"));
                    existing.clone()
                }
                None => {
                    let fetch = self.start_fetch(key);
                    state.in_flight.insert(key, fetch.clone());
                    fetch
                }
            }
        };

        pending.await
    }

    fn start_fetch(&self, key: CacheKey) -> PendingFetch {
        let source = Arc::clone(&self.source);
        let log = Arc::clone(&self.log);
        let state = Arc::clone(&self.state);
        let (max_entries, max_age) = (self.max_entries, self.max_age);

        async move {
            let _pending = PendingGuard { state: Arc::clone(&state), key };
            log.record(EventKind::Request, &format!("→ fetch {key}"));
            let started = Instant::now();

            match source.fetch(key.bounds()).await {
                Ok(list) => {
                    let entities: EntityList = list.into();
                    let evicted = {
                        let mut state = lock(&state);
                        let now = Instant::now();
                        state.entries.insert(
                            key,
                            Entry { entities: Arc::clone(&entities), fetched_at: now },
                        );
                        state.evict(now, max_entries, max_age)
                    };
                    if evicted > 0 {
                        tracing::debug!(evicted, %key, "cache eviction pass");
                    }
                    log.record(
                        EventKind::Response,
                        &format!(
                            "← {} entities for {key} ({} ms)",
                            entities.len(),
                            started.elapsed().as_millis()
                        ),
                    );
                    entities
                }
                Err(e) => {
                    log.record(EventKind::Error, &format!("fetch {key} failed: {e}"));
                    EntityList::from(Vec::new())
                }
            }
        }
        .boxed()
        .shared()
    }
}
