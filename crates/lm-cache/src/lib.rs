//! `lm-cache` — the viewport-quantized request cache.
//!
//! # Crate layout
//!
//! | Module    | Contents                                                    |
//! |-----------|-------------------------------------------------------------|
//! | [`key`]   | `CacheKey` — viewport bounds snapped outward to a grid      |
//! | [`cache`] | `ViewportCache` — TTL, in-flight dedup, eviction, stats     |
//!
//! # Lookup order
//!
//! 1. Fresh entry for the key → returned, no fetch (`skipped` event).
//! 2. Fetch already pending for the key → the caller awaits that fetch.
//! 3. Otherwise one fetch is issued; its result is stored and an eviction
//!    pass runs.  Failures are logged and resolve to an empty list.

pub mod cache;
pub mod key;


pub use cache::{CacheStats, EntityList, ViewportCache};
pub use key::CacheKey;
