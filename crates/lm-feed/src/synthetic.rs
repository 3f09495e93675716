//! Seeded random-walk vehicle feed for demos and tests.
//!
//! # Determinism strategy
//!
//! Each vehicle gets its own `SmallRng` seeded by:
//!
//!   seed = feed_seed XOR (index * MIXING_CONSTANT)
//!
//! so adding vehicles at the end of the fleet does not disturb the walks of
//! existing ones, and the same seed always replays the same movements.

use std::sync::Mutex;

use async_trait::async_trait;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use lm_core::{Bounds, EntityAttributes, EntitySnapshot, GeoPoint, SourceError};

use crate::EntitySource;

/// 64-bit fractional golden-ratio constant for seed mixing.
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

const OPERATORS: [&str; 4] = ["EYMS", "STNC", "ARRI", "FSCE"];

struct Vehicle {
    id:       String,
    position: GeoPoint,
    heading:  f64, // radians, 0 = north
    line:     String,
    operator: &'static str,
    rng:      SmallRng,
}

/// A fleet of vehicles wandering around `area`.
///
/// Call [`step`](Self::step) to advance the fleet; [`fetch`](EntitySource::fetch)
/// returns the current positions inside the requested bounds.
pub struct SyntheticFeed {
    area:     Bounds,
    step_deg: f64,
    fleet:    Mutex<Vec<Vehicle>>,
}

impl SyntheticFeed {
    /// `step_deg` is the typical per-step displacement in degrees
    /// (0.001 ≈ 110 m).
    pub fn new(area: Bounds, vehicles: usize, step_deg: f64, seed: u64) -> Self {
        let fleet = (0..vehicles)
            .map(|i| {
                let mut rng =
                    SmallRng::seed_from_u64(seed ^ (i as u64).wrapping_mul(MIXING_CONSTANT));
                let position = GeoPoint::new(
                    rng.gen_range(area.south..=area.north),
                    rng.gen_range(area.west..=area.east),
                );
                let operator = OPERATORS[i % OPERATORS.len()];
                Vehicle {
                    id: format!("{operator}-{i:04}"),
                    position,
                    heading: rng.gen_range(0.0..std::f64::consts::TAU),
                    line: format!("{}", 1 + i % 40),
                    operator,
                    rng,
                }
            })
            .collect();
        Self { area, step_deg, fleet: Mutex::new(fleet) }
    }

    /// Move every vehicle one step, turning gently and bouncing off the
    /// edges of the area.
    pub fn step(&self) {
        let Ok(mut fleet) = self.fleet.lock() else { return };
        for v in fleet.iter_mut() {
            v.heading += v.rng.gen_range(-0.4..0.4);
            let dist = self.step_deg * v.rng.gen_range(0.5..1.5);
            let mut next = GeoPoint::new(
                v.position.lat + dist * v.heading.cos(),
                v.position.lon + dist * v.heading.sin(),
            );
            if !self.area.contains(next) {
                v.heading += std::f64::consts::PI;
                next = GeoPoint::new(
                    next.lat.clamp(self.area.south, self.area.north),
                    next.lon.clamp(self.area.west, self.area.east),
                );
            }
            v.position = next;
        }
    }

    /// Current snapshot of the whole fleet.
    pub fn snapshot(&self) -> Vec<EntitySnapshot> {
        let Ok(fleet) = self.fleet.lock() else { return Vec::new() };
        fleet
            .iter()
            .filter_map(|v| {
                let attributes = EntityAttributes {
                    line:        v.line.clone(),
                    operator:    v.operator.to_string(),
                    destination: "Depot".into(),
                    timestamp:   None,
                    extra:       Default::default(),
                };
                EntitySnapshot::new(v.id.as_str(), v.position, attributes).ok()
            })
            .collect()
    }
}

#[async_trait]
impl EntitySource for SyntheticFeed {
    async fn fetch(&self, bounds: Bounds) -> Result<Vec<EntitySnapshot>, SourceError> {
        Ok(self.snapshot().into_iter().filter(|e| bounds.contains(e.position())).collect())
    }
}
