//! `lm-core` — foundational types for the `livemap` engine.
//!
//! This crate is a dependency of every other `lm-*` crate.  It intentionally
//! has no `lm-*` dependencies and few external ones (`serde`, `thiserror`,
//! `toml`, `tracing`).
//!
//! # What lives here
//!
//! | Module       | Contents                                                |
//! |--------------|---------------------------------------------------------|
//! | [`ids`]      | `EntityId`                                              |
//! | [`geo`]      | `GeoPoint`, haversine distance, interpolation           |
//! | [`viewport`] | `Bounds`, `Viewport` (bounds + zoom level)              |
//! | [`time`]     | `FrameTime` — millisecond frame clock                   |
//! | [`entity`]   | `EntitySnapshot`, `EntityAttributes`                    |
//! | [`config`]   | `EngineConfig` (TOML + environment overrides)           |
//! | [`log`]      | `EventLog` port, `TracingLog`, `NoopLog`                |
//! | [`error`]    | `CoreError`, `SourceError`, `CoreResult`                |

pub mod config;
pub mod entity;
pub mod error;
pub mod geo;
pub mod ids;
pub mod log;
pub mod time;
pub mod viewport;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::EngineConfig;
pub use entity::{EntityAttributes, EntitySnapshot};
pub use error::{CoreError, CoreResult, SourceError};
pub use geo::GeoPoint;
pub use ids::EntityId;
pub use log::{DynLog, EventKind, EventLog, NoopLog, TracingLog};
pub use time::FrameTime;
pub use viewport::{Bounds, Viewport};
