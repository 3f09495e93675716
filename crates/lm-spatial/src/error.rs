//! Routing error type.

use thiserror::Error;

use lm_core::{GeoPoint, SourceError};

use crate::JunctionId;

/// Errors produced by route sources.
///
/// None of these reach the engine: [`RouteResolver`](crate::RouteResolver)
/// logs them and answers `None`, and the caller falls back to a straight
/// line.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RouteError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("no route from {from} to {to}")]
    NoRoute { from: GeoPoint, to: GeoPoint },

    #[error("no path between junctions {from} and {to}")]
    Unreachable { from: JunctionId, to: JunctionId },
}

pub type RouteResult<T> = Result<T, RouteError>;
