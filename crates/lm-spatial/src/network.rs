//! Street graph behind [`GraphRouteSource`](crate::GraphRouteSource).
//!
//! Streets are grouped by the junction they leave: the streets out of
//! junction `j` are `streets[first_street[j] .. first_street[j + 1]]`, so
//! Dijkstra's relaxation step reads one contiguous slice.  An R-tree over
//! the junctions answers "which junction is this vehicle standing at".

use std::fmt;
use std::sync::Arc;

use rstar::RTree;
use rstar::primitives::GeomWithData;

use lm_core::GeoPoint;

/// Index of a junction in a [`StreetGraph`].
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct JunctionId(pub u32);

impl JunctionId {
    #[inline(always)]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for JunctionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "J{}", self.0)
    }
}

/// Position of a street in [`StreetGraph`]'s street table.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct StreetId(pub u32);

impl StreetId {
    #[inline(always)]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// One direction of travel between two junctions.
#[derive(Clone, Debug, PartialEq)]
pub struct Street {
    pub from:      JunctionId,
    pub to:        JunctionId,
    /// Dijkstra cost.
    pub travel_ms: u32,
    /// Reported as the route's road name.
    pub name:      Option<Arc<str>>,
}

/// `[lat, lon]` tagged with its junction.
type JunctionPoint = GeomWithData<[f64; 2], JunctionId>;

// ── StreetGraph ───────────────────────────────────────────────────────────────

/// Directed street graph with a nearest-junction index.
///
/// Build with [`StreetGraphBuilder`].
pub struct StreetGraph {
    junctions:    Vec<GeoPoint>,
    first_street: Vec<u32>,
    streets:      Vec<Street>,
    index:        RTree<JunctionPoint>,
}

impl StreetGraph {
    pub fn junction_count(&self) -> usize {
        self.junctions.len()
    }

    pub fn street_count(&self) -> usize {
        self.streets.len()
    }

    pub fn position(&self, junction: JunctionId) -> Option<GeoPoint> {
        self.junctions.get(junction.index()).copied()
    }

    pub fn street(&self, id: StreetId) -> &Street {
        &self.streets[id.index()]
    }

    /// Streets leaving `junction`; empty for an unknown id.
    pub fn streets_from(&self, junction: JunctionId) -> impl Iterator<Item = (StreetId, &Street)> + '_ {
        let (start, end) = match (
            self.first_street.get(junction.index()),
            self.first_street.get(junction.index() + 1),
        ) {
            (Some(&s), Some(&e)) => (s, e),
            _ => (0, 0),
        };
        (start..end).map(move |i| (StreetId(i), &self.streets[i as usize]))
    }

    /// Nearest junction to `pos`, if it is no more than `max_m` metres
    /// away.
    ///
    /// The R-tree ranks candidates in raw degree space; the cut-off is
    /// applied with the haversine distance.
    pub fn nearest_junction(&self, pos: GeoPoint, max_m: f64) -> Option<JunctionId> {
        let hit = self.index.nearest_neighbor(&[pos.lat, pos.lon])?;
        let [lat, lon] = *hit.geom();
        (pos.distance_m(GeoPoint::new(lat, lon)) <= max_m).then_some(hit.data)
    }
}

// ── StreetGraphBuilder ────────────────────────────────────────────────────────

/// Collect junctions and streets, then [`build`](Self::build).
///
/// ```
/// use lm_core::GeoPoint;
/// use lm_spatial::StreetGraphBuilder;
///
/// let mut b = StreetGraphBuilder::new();
/// let a = b.add_junction(GeoPoint::new(51.500, -0.100));
/// let c = b.add_junction(GeoPoint::new(51.501, -0.100));
/// b.connect(a, c, 10.0, Some("High Street"));
/// assert_eq!(b.build().street_count(), 2);
/// ```
#[derive(Default)]
pub struct StreetGraphBuilder {
    junctions: Vec<GeoPoint>,
    streets:   Vec<Street>,
}

impl StreetGraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_junction(&mut self, pos: GeoPoint) -> JunctionId {
        self.junctions.push(pos);
        JunctionId(self.junctions.len() as u32 - 1)
    }

    /// One-way street with an explicit travel time.
    pub fn add_street(&mut self, from: JunctionId, to: JunctionId, travel_ms: u32, name: Option<&str>) {
        self.streets.push(Street { from, to, travel_ms, name: name.map(Arc::from) });
    }

    /// Two-way street whose travel time is the haversine length between
    /// its junctions at `speed_mps`.  A non-positive speed makes it
    /// impassable.
    pub fn connect(&mut self, a: JunctionId, b: JunctionId, speed_mps: f64, name: Option<&str>) {
        let travel_ms = match (self.junctions.get(a.index()), self.junctions.get(b.index())) {
            (Some(pa), Some(pb)) if speed_mps > 0.0 => {
                (pa.distance_m(*pb) / speed_mps * 1000.0).round() as u32
            }
            _ => u32::MAX,
        };
        self.add_street(a, b, travel_ms, name);
        self.add_street(b, a, travel_ms, name);
    }

    pub fn build(self) -> StreetGraph {
        let n = self.junctions.len();
        let mut streets = self.streets;
        streets.retain(|s| s.from.index() < n && s.to.index() < n);
        streets.sort_by_key(|s| s.from);

        let mut first_street = vec![0u32; n + 1];
        for s in &streets {
            first_street[s.from.index() + 1] += 1;
        }
        for j in 0..n {
            first_street[j + 1] += first_street[j];
        }

        let points = self
            .junctions
            .iter()
            .enumerate()
            .map(|(i, p)| JunctionPoint::new([p.lat, p.lon], JunctionId(i as u32)))
            .collect();

        StreetGraph {
            junctions: self.junctions,
            first_street,
            streets,
            index: RTree::bulk_load(points),
        }
    }
}
