//! In-process routing over a [`StreetGraph`].
//!
//! [`GraphRouteSource`] answers the same questions an OSRM deployment
//! would: both positions are snapped to their nearest junction, Dijkstra
//! finds the fastest junction path, and the result is returned as a
//! polyline `from → junctions… → to` with the summed travel time as the
//! duration.
//!
//! # Cost units
//!
//! Edge costs and totals are **milliseconds** (`u32`).

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::sync::Arc;

use async_trait::async_trait;

use lm_core::GeoPoint;

use crate::network::{JunctionId, StreetGraph, StreetId};
use crate::{Route, RouteError, RouteResult, RouteSource};

// ── JunctionPath ──────────────────────────────────────────────────────────────

/// A junction-level shortest path.
#[derive(Debug, Clone, PartialEq)]
pub struct JunctionPath {
    /// Visited junctions, source first.  A single junction for a trivial
    /// path.
    pub junctions: Vec<JunctionId>,
    pub streets:   Vec<StreetId>,
    pub total_ms:  u32,
}

impl JunctionPath {
    pub fn is_trivial(&self) -> bool {
        self.streets.is_empty()
    }
}

// ── Dijkstra ──────────────────────────────────────────────────────────────────

/// Fastest path from `from` to `to` by street travel time.
pub fn shortest_path(graph: &StreetGraph, from: JunctionId, to: JunctionId) -> RouteResult<JunctionPath> {
    let n = graph.junction_count();
    if from.index() >= n || to.index() >= n {
        return Err(RouteError::Unreachable { from, to });
    }
    if from == to {
        return Ok(JunctionPath { junctions: vec![from], streets: vec![], total_ms: 0 });
    }

    let mut best: Vec<u32> = vec![u32::MAX; n];
    let mut via:  Vec<Option<StreetId>> = vec![None; n];
    best[from.index()] = 0;

    // Min-heap on cost; JunctionId breaks ties deterministically.
    let mut heap: BinaryHeap<Reverse<(u32, JunctionId)>> = BinaryHeap::new();
    heap.push(Reverse((0, from)));

    while let Some(Reverse((cost, here))) = heap.pop() {
        if here == to {
            return Ok(walk_back(graph, &via, from, to, cost));
        }
        if cost > best[here.index()] {
            continue;
        }
        for (id, street) in graph.streets_from(here) {
            let next = cost.saturating_add(street.travel_ms);
            if next < best[street.to.index()] {
                best[street.to.index()] = next;
                via[street.to.index()] = Some(id);
                heap.push(Reverse((next, street.to)));
            }
        }
    }

    Err(RouteError::Unreachable { from, to })
}

fn walk_back(
    graph:    &StreetGraph,
    via:      &[Option<StreetId>],
    from:     JunctionId,
    to:       JunctionId,
    total_ms: u32,
) -> JunctionPath {
    let mut streets = Vec::new();
    let mut cur = to;
    while cur != from {
        let Some(id) = via[cur.index()] else { break };
        streets.push(id);
        cur = graph.street(id).from;
    }
    streets.reverse();

    let mut junctions = Vec::with_capacity(streets.len() + 1);
    junctions.push(from);
    junctions.extend(streets.iter().map(|&id| graph.street(id).to));
    JunctionPath { junctions, streets, total_ms }
}

// ── GraphRouteSource ──────────────────────────────────────────────────────────

/// [`RouteSource`] backed by an in-memory street graph, for running the
/// engine without an OSRM deployment.
pub struct GraphRouteSource {
    graph:      Arc<StreetGraph>,
    max_snap_m: f64,
}

impl GraphRouteSource {
    /// Positions farther than 150 m from any junction are not routed.
    pub fn new(graph: Arc<StreetGraph>) -> Self {
        Self { graph, max_snap_m: 150.0 }
    }

    pub fn with_max_snap(mut self, max_snap_m: f64) -> Self {
        self.max_snap_m = max_snap_m;
        self
    }

    pub fn graph(&self) -> &StreetGraph {
        &self.graph
    }

    /// Synchronous core of [`RouteSource::route`].
    pub fn route_between(&self, from: GeoPoint, to: GeoPoint) -> RouteResult<Route> {
        let no_route = || RouteError::NoRoute { from, to };
        let graph = &self.graph;
        let start = graph.nearest_junction(from, self.max_snap_m).ok_or_else(no_route)?;
        let goal  = graph.nearest_junction(to, self.max_snap_m).ok_or_else(no_route)?;
        let path = shortest_path(graph, start, goal).map_err(|_| no_route())?;

        let mut points = Vec::with_capacity(path.junctions.len() + 2);
        points.push(from);
        points.extend(path.junctions.iter().filter_map(|&j| graph.position(j)));
        points.push(to);
        points.dedup();

        let distance_m = points.windows(2).map(|w| w[0].distance_m(w[1])).sum();
        let road_name = path
            .streets
            .iter()
            .rev()
            .find_map(|&id| graph.street(id).name.as_deref())
            .map(str::to_owned);

        Ok(Route {
            points,
            duration_ms: path.total_ms as f64,
            distance_m,
            road_name,
        })
    }
}

#[async_trait]
impl RouteSource for GraphRouteSource {
    async fn route(&self, from: GeoPoint, to: GeoPoint) -> RouteResult<Route> {
        self.route_between(from, to)
    }
}
