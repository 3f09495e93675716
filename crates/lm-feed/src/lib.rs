//! `lm-feed` — where entity snapshots come from.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                    |
//! |---------------|-------------------------------------------------------------|
//! | [`source`]    | `EntitySource` port (async fetch by bounds), `StaticSource` |
//! | [`wire`]      | `/api/buses`-style JSON → validated `EntitySnapshot`s       |
//! | [`loader`]    | CSV batch replay (`load_batches_reader`, `ReplaySource`)    |
//! | [`synthetic`] | `SyntheticFeed` — seeded random-walk vehicles               |
//! | [`error`]     | `FeedError`, `FeedResult<T>`                                |
//!
//! The engine never sees transport.  HTTP clients, file replays, and test
//! fakes all sit behind [`EntitySource`].

pub mod error;
pub mod loader;
pub mod source;
pub mod synthetic;
pub mod wire;


pub use error::{FeedError, FeedResult};
pub use loader::{load_batches_csv, load_batches_reader, ReplaySource};
pub use source::{EntitySource, StaticSource};
pub use synthetic::SyntheticFeed;
pub use wire::{parse_vehicles_json, VehiclesResponse};
