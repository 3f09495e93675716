//! `lm-anim` — moving markers smoothly between snapshots.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                       |
//! |---------------|----------------------------------------------------------------|
//! | [`path`]      | `AnimationPath` — validated polyline (≥ 2 points), sampling    |
//! | [`marker`]    | `TrackedMarker`, `MarkerState`, `MarkerRegistry`               |
//! | [`task`]      | `AnimationTask`, `TaskOutcome`, `OnComplete`                   |
//! | [`scheduler`] | `AnimationScheduler` — per-entity task table, frame advance    |
//! | [`error`]     | `AnimError`, `AnimResult<T>`                                   |
//!
//! # Frame model
//!
//! ```text
//! animate(id, path, duration)     → task stored in the table (replaces any
//!                                    previous task for id; old one completes
//!                                    as Superseded)
//! advance(now)  every frame       → first frame binds the baseline
//!                                    progress = unpaused elapsed / duration
//!                                    ≥ 1 or marker out of view → snap to the
//!                                    last point, complete
//!                                    otherwise lerp on the bracketing segment
//! ```
//!
//! Every task completes exactly once, whichever way it ends.  The scheduler
//! writes only `TrackedMarker::displayed` and the animating flag; marker
//! membership belongs to the caller.

pub mod error;
pub mod marker;
pub mod path;
pub mod scheduler;
pub mod task;


pub use error::{AnimError, AnimResult};
pub use marker::{MarkerRegistry, MarkerState, TrackedMarker};
pub use path::AnimationPath;
pub use scheduler::{AnimationScheduler, FrameReport, TaskStart};
pub use task::{AnimationTask, OnComplete, TaskOutcome};
