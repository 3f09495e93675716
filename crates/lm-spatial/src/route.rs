//! The routing port and its answer type.

use std::sync::Arc;

use async_trait::async_trait;

use lm_core::GeoPoint;

use crate::RouteResult;

/// A road-following path between two positions.
#[derive(Clone, Debug, PartialEq)]
pub struct Route {
    /// Ordered polyline from origin to destination.
    pub points: Vec<GeoPoint>,
    /// Suggested travel time in milliseconds.
    pub duration_ms: f64,
    pub distance_m: f64,
    /// Name of the road at the destination, when the source reports one.
    pub road_name: Option<String>,
}

impl Route {
    /// Polyline as `[lon, lat]` pairs, the order animation paths take.
    pub fn lon_lat_points(&self) -> Vec<[f64; 2]> {
        self.points.iter().map(|p| p.to_lon_lat()).collect()
    }

    /// A route the engine can animate along: at least two points, all valid.
    pub fn is_usable(&self) -> bool {
        self.points.len() >= 2 && self.points.iter().all(|p| p.is_valid())
    }
}

/// External routing collaborator.
///
/// # Thread safety
///
/// Implementations must be `Send + Sync`; one source is shared by every
/// engine task that resolves routes.
#[async_trait]
pub trait RouteSource: Send + Sync {
    async fn route(&self, from: GeoPoint, to: GeoPoint) -> RouteResult<Route>;
}

#[async_trait]
impl<S: RouteSource + ?Sized> RouteSource for Arc<S> {
    async fn route(&self, from: GeoPoint, to: GeoPoint) -> RouteResult<Route> {
        (**self).route(from, to).await
    }
}
