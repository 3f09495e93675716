//! Route resolution for the animation engine.
//!
//! The resolver decides *whether* a displacement is worth routing and
//! converts every failure into `None`.  Nothing is memoized: two vehicles
//! travelling between the same positions cause two requests.

use std::sync::Arc;
use std::time::Instant;

use lm_core::{DynLog, EngineConfig, EventKind, GeoPoint};

use crate::{Route, RouteSource};

/// Gatekeeper in front of a [`RouteSource`].
pub struct RouteResolver {
    source:         Arc<dyn RouteSource>,
    log:            DynLog,
    enabled:        bool,
    zoom_threshold: u8,
    min_distance_m: f64,
}

impl RouteResolver {
    pub fn new(source: Arc<dyn RouteSource>, log: DynLog, config: &EngineConfig) -> Self {
        Self {
            source,
            log,
            enabled:        config.routing_enabled,
            zoom_threshold: config.routing_zoom_threshold,
            min_distance_m: config.min_route_distance_m,
        }
    }

    /// `true` if a move from `from` to `to` seen at `zoom` should follow the
    /// road network rather than a straight line.
    pub fn should_route(&self, zoom: u8, from: GeoPoint, to: GeoPoint) -> bool {
        self.enabled && zoom >= self.zoom_threshold && from.distance_m(to) > self.min_distance_m
    }

    /// Ask the routing collaborator for a path.
    ///
    /// Returns `None`, after logging, on any failure or on a route with
    /// fewer than two usable points; the caller then interpolates in a
    /// straight line.
    pub async fn route(&self, from: GeoPoint, to: GeoPoint) -> Option<Route> {
        self.log.record(EventKind::Request, &format!("route {from} → {to}"));
        let started = Instant::now();

        match self.source.route(from, to).await {
            Ok(route) if route.is_usable() => {
                self.log.record(
                    EventKind::Response,
                    &format!(
                        "route {} points, {:.0} ms travel, {:.0} m ({} ms)",
                        route.points.len(),
                        route.duration_ms,
                        route.distance_m,
                        started.elapsed().as_millis()
                    ),
                );
                Some(route)
            }
            Ok(route) => {
                self.log.record(
                    EventKind::Error,
                    &format!("route unusable ({} points), using straight line", route.points.len()),
                );
                None
            }
            Err(e) => {
                self.log.record(EventKind::Error, &format!("route failed: {e}"));
                None
            }
        }
    }
}
