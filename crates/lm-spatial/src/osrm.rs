//! OSRM `/route/v1` wire format.
//!
//! Only the fields the animation needs are read:
//!
//! ```json
//! {
//!   "code": "Ok",
//!   "routes": [{
//!     "geometry": { "coordinates": [[-0.0877, 51.5079], [-0.0870, 51.5085]] },
//!     "duration": 41.2,
//!     "distance": 310.5
//!   }],
//!   "waypoints": [{ "name": "" }, { "name": "Tower Bridge Road" }]
//! }
//! ```
//!
//! Coordinates are `[lon, lat]`; `duration` is seconds.  HTTP transport is
//! left to the application, which hands the body to [`parse_osrm_json`].

use serde::Deserialize;

use lm_core::{GeoPoint, SourceError};

use crate::{Route, RouteError, RouteResult};

#[derive(Deserialize)]
struct RawResponse {
    code:      String,
    #[serde(default)]
    message:   Option<String>,
    #[serde(default)]
    routes:    Vec<RawRoute>,
    #[serde(default)]
    waypoints: Vec<RawWaypoint>,
}

#[derive(Deserialize)]
struct RawRoute {
    geometry: RawGeometry,
    duration: f64,
    #[serde(default)]
    distance: f64,
}

#[derive(Deserialize)]
struct RawGeometry {
    coordinates: Vec<serde_json::Value>,
}

#[derive(Deserialize)]
struct RawWaypoint {
    #[serde(default)]
    name: Option<String>,
}

/// Request path (relative to the service base URL) for a driving route with
/// GeoJSON geometry.
pub fn osrm_route_path(from: GeoPoint, to: GeoPoint) -> String {
    format!(
        "/route/v1/driving/{},{};{},{}?geometries=geojson&overview=full",
        from.lon, from.lat, to.lon, to.lat
    )
}

/// Parse an OSRM route response body.
///
/// Coordinates that are not numeric `[lon, lat]` pairs are dropped; the
/// animation layer decides what to do with a route that ends up too short.
/// A `code` other than `"Ok"` (e.g. `"NoRoute"`) is [`RouteError::NoRoute`].
pub fn parse_osrm_json(body: &str, from: GeoPoint, to: GeoPoint) -> RouteResult<Route> {
    let raw: RawResponse =
        serde_json::from_str(body).map_err(|e| SourceError::Malformed(e.to_string()))?;

    if raw.code != "Ok" {
        tracing::debug!(code = %raw.code, message = ?raw.message, "routing service declined");
        return Err(RouteError::NoRoute { from, to });
    }

    let Some(route) = raw.routes.into_iter().next() else {
        return Err(SourceError::Malformed("`routes` is empty".into()).into());
    };

    let points = route
        .geometry
        .coordinates
        .iter()
        .filter_map(lon_lat_pair)
        .map(GeoPoint::from_lon_lat)
        .filter(|p| p.is_valid())
        .collect();

    let road_name = raw
        .waypoints
        .into_iter()
        .nth(1)
        .and_then(|w| w.name)
        .filter(|n| !n.is_empty());

    Ok(Route {
        points,
        duration_ms: route.duration * 1000.0,
        distance_m:  route.distance,
        road_name,
    })
}

fn lon_lat_pair(value: &serde_json::Value) -> Option<[f64; 2]> {
    let arr = value.as_array()?;
    if arr.len() < 2 {
        return None;
    }
    Some([arr[0].as_f64()?, arr[1].as_f64()?])
}
