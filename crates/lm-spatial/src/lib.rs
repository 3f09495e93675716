//! `lm-spatial` — road geometry for animations.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                     |
//! |--------------|--------------------------------------------------------------|
//! | [`route`]    | `Route` (polyline + duration), `RouteSource` port            |
//! | [`osrm`]     | OSRM `/route/v1` request paths and response parsing          |
//! | [`network`]  | `StreetGraph` (grouped streets + R-tree), its builder        |
//! | [`router`]   | `GraphRouteSource` — Dijkstra over a `StreetGraph`           |
//! | [`resolver`] | `RouteResolver` — zoom/distance gate, failure → `None`       |
//! | [`error`]    | `RouteError`, `RouteResult<T>`                               |
//!
//! The engine only talks to [`RouteResolver`].  Whatever answers behind the
//! [`RouteSource`] port is interchangeable: an OSRM proxy in production,
//! the in-process graph router for offline runs, a script in tests.

pub mod error;
pub mod network;
pub mod osrm;
pub mod resolver;
pub mod route;
pub mod router;


pub use error::{RouteError, RouteResult};
pub use network::{JunctionId, Street, StreetGraph, StreetGraphBuilder, StreetId};
pub use osrm::{osrm_route_path, parse_osrm_json};
pub use resolver::RouteResolver;
pub use route::{Route, RouteSource};
pub use router::{shortest_path, GraphRouteSource, JunctionPath};
