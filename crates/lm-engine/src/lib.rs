//! `lm-engine` — marker lifecycle and frame loop for the livemap engine.
//!
//! # Three clocks
//!
//! ```text
//! refresh(now)            — every few seconds (RefreshCadence)
//!   ① Gate      — zoom below min_zoom_for_fetch → log `skipped`, stop.
//!   ② Resolve   — ViewportCache: fresh entry, joined pending fetch, or a
//!                 new fetch; failures become an empty batch.
//!   ③ Reconcile — per snapshot: store, then add / redirect / remove its
//!                 marker; redirects may await the RouteResolver.
//!   ④ Sweep     — markers missing from the batch are removed, or parked
//!                 while they animate.
//!
//! frame(now)              — every display frame
//!   ① Advance   — AnimationScheduler moves animating markers.
//!   ② Finish    — ended tasks clear their route and carry out parked
//!                 removals.
//!
//! set_viewport(v)         — whenever the map moves; read by both loops.
//! ```
//!
//! # Crate layout
//!
//! | Module      | Contents                                                |
//! |-------------|---------------------------------------------------------|
//! | [`engine`]  | `Engine`, `ReconcileReport`                             |
//! | [`builder`] | `EngineBuilder`                                         |
//! | [`store`]   | `PositionStore` — last-known snapshot per entity        |
//! | [`sink`]    | `MarkerSink` port, `NoopSink`, `RecordingSink`          |
//! | [`cadence`] | `RefreshCadence` — normal / scenic refresh interval     |
//! | [`error`]   | `EngineError`, `EngineResult<T>`                        |
//!
//! # Cargo features
//!
//! | Feature   | Effect                                                   |
//! |-----------|----------------------------------------------------------|
//! | `fx-hash` | FxHash instead of SipHash for the store and batch id sets. |

pub mod builder;
pub mod cadence;
pub mod engine;
pub mod error;
pub mod sink;
pub mod store;

#[cfg(test)]
mod tests;

pub use builder::EngineBuilder;
pub use cadence::RefreshCadence;
pub use engine::{Engine, ReconcileReport};
pub use error::{EngineError, EngineResult};
pub use sink::{MarkerSink, NoopSink, RecordingSink, SinkEvent};
pub use store::{PositionStore, StoredEntity};

// Animation types that appear in the engine's own API.
pub use lm_anim::{FrameReport, MarkerState, OnComplete, TaskOutcome, TaskStart};
