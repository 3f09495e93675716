//! Engine configuration.
//!
//! Loaded from a TOML file by the application and optionally overridden by
//! environment variables (the names the backend deployment uses), then
//! validated once before the engine is built.  Every field has a default so
//! a partial file is enough.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::{CoreError, CoreResult};

/// Tunables for the cache, routing gate, animation, and refresh cadence.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    // ── Viewport cache ────────────────────────────────────────────────────
    /// Quantization grid for cache keys, in degrees.
    pub tile_size_degrees: f64,

    /// Entry TTL below the realtime zoom threshold.
    pub cache_ttl_ms: u64,

    /// Entry TTL at or above `realtime_zoom_threshold`.
    pub realtime_cache_ttl_ms: u64,

    pub realtime_zoom_threshold: u8,

    /// Eviction bound on entry count (oldest dropped first).
    pub cache_max_entries: usize,

    /// Eviction bound on entry age.
    pub cache_max_age_ms: u64,

    // ── Refresh gating ────────────────────────────────────────────────────
    /// Below this zoom no fetch is issued.
    pub min_zoom_for_fetch: u8,

    // ── Routing ───────────────────────────────────────────────────────────
    /// Master switch; `false` when no routing service is configured.
    pub routing_enabled: bool,

    pub routing_zoom_threshold: u8,

    /// Displacements shorter than this never consult the router.
    pub min_route_distance_m: f64,

    // ── Animation ─────────────────────────────────────────────────────────
    /// Movement below this is treated as GPS jitter and not animated.
    pub min_move_m: f64,

    /// Per-frame position changes below this (degrees, either axis) are
    /// not pushed to the marker.
    pub redraw_epsilon_deg: f64,

    /// Duration of an entity's first animation (no previous update time).
    pub default_animation_ms: f64,

    // ── Refresh cadence ───────────────────────────────────────────────────
    pub refresh_interval_ms: u64,
    pub scenic_refresh_interval_ms: u64,
    /// Batch size above which the slow ("scenic") cadence is entered.
    pub scenic_enter_count: usize,
    /// Batch size below which the fast cadence is restored.
    pub scenic_exit_count: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tile_size_degrees:          0.1,
            cache_ttl_ms:               3_000,
            realtime_cache_ttl_ms:      300,
            realtime_zoom_threshold:    16,
            cache_max_entries:          500,
            cache_max_age_ms:           300_000,
            min_zoom_for_fetch:         14,
            routing_enabled:            true,
            routing_zoom_threshold:     17,
            min_route_distance_m:       100.0,
            min_move_m:                 10.0,
            redraw_epsilon_deg:         0.000_005,
            default_animation_ms:       2_000.0,
            refresh_interval_ms:        30_000,
            scenic_refresh_interval_ms: 20_000,
            scenic_enter_count:         1_000,
            scenic_exit_count:          500,
        }
    }
}

impl EngineConfig {
    /// Parse a (possibly partial) TOML document.
    pub fn from_toml_str(s: &str) -> CoreResult<Self> {
        Ok(toml::from_str(s)?)
    }

    pub fn from_file(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Apply overrides from the process environment.
    pub fn apply_env_overrides(&mut self) -> CoreResult<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary lookup (the environment in
    /// production, a map in tests).  Empty values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> CoreResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        fn parse<T: std::str::FromStr>(key: &str, raw: &str) -> CoreResult<T> {
            raw.trim()
                .parse()
                .map_err(|_| CoreError::Config(format!("{key}={raw:?} is not a valid value")))
        }

        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("TILE_SIZE_DEGREES") {
            self.tile_size_degrees = parse("TILE_SIZE_DEGREES", &v)?;
        }
        if let Some(v) = get("CLIENT_CACHE_TTL_MS") {
            self.cache_ttl_ms = parse("CLIENT_CACHE_TTL_MS", &v)?;
        }
        if let Some(v) = get("REALTIME_CACHE_TTL_MS") {
            self.realtime_cache_ttl_ms = parse("REALTIME_CACHE_TTL_MS", &v)?;
        }
        if let Some(v) = get("REALTIME_ZOOM_THRESHOLD") {
            self.realtime_zoom_threshold = parse("REALTIME_ZOOM_THRESHOLD", &v)?;
        }
        if let Some(v) = get("ROUTING_ZOOM_THRESHOLD") {
            self.routing_zoom_threshold = parse("ROUTING_ZOOM_THRESHOLD", &v)?;
        }
        if let Some(v) = get("REFRESH_INTERVAL_MS") {
            self.refresh_interval_ms = parse("REFRESH_INTERVAL_MS", &v)?;
        }
        if let Some(v) = get("CACHE_MAX") {
            self.cache_max_entries = parse("CACHE_MAX", &v)?;
        }
        Ok(())
    }

    /// Reject values that would make the engine misbehave silently.
    pub fn validate(&self) -> CoreResult<()> {
        if !(self.tile_size_degrees.is_finite() && self.tile_size_degrees > 0.0) {
            return Err(CoreError::Config(format!(
                "tile_size_degrees must be positive, got {}",
                self.tile_size_degrees
            )));
        }
        if self.cache_max_entries == 0 {
            return Err(CoreError::Config("cache_max_entries must be at least 1".into()));
        }
        if self.min_move_m < 0.0 || self.min_route_distance_m < 0.0 {
            return Err(CoreError::Config("distance thresholds must be non-negative".into()));
        }
        if !(self.default_animation_ms.is_finite() && self.default_animation_ms >= 0.0) {
            return Err(CoreError::Config("default_animation_ms must be non-negative".into()));
        }
        if self.scenic_exit_count > self.scenic_enter_count {
            return Err(CoreError::Config(format!(
                "scenic_exit_count ({}) exceeds scenic_enter_count ({})",
                self.scenic_exit_count, self.scenic_enter_count
            )));
        }
        Ok(())
    }

    /// Cache TTL for a viewport at `zoom`.
    pub fn cache_ttl(&self, zoom: u8) -> Duration {
        if zoom >= self.realtime_zoom_threshold {
            Duration::from_millis(self.realtime_cache_ttl_ms)
        } else {
            Duration::from_millis(self.cache_ttl_ms)
        }
    }

    #[inline]
    pub fn cache_max_age(&self) -> Duration {
        Duration::from_millis(self.cache_max_age_ms)
    }
}
