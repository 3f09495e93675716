//! Synthetic street grid for the in-process router.

use lm_core::{Bounds, GeoPoint};
use lm_spatial::{StreetGraph, StreetGraphBuilder};

/// Urban bus speed, ≈ 29 km/h.
const STREET_SPEED_MPS: f64 = 8.0;

/// Build a `size × size` grid of two-way streets spanning `area`.
///
/// Rows are named "Row N" and columns "Avenue N" so routed popups have a
/// road name to show.
pub fn build_grid(area: &Bounds, size: usize) -> StreetGraph {
    let size = size.max(2);
    let mut b = StreetGraphBuilder::new();

    let lat_step = (area.north - area.south) / (size - 1) as f64;
    let lon_step = (area.east - area.west) / (size - 1) as f64;

    let mut ids = Vec::with_capacity(size * size);
    for row in 0..size {
        for col in 0..size {
            let pos = GeoPoint::new(
                area.south + row as f64 * lat_step,
                area.west + col as f64 * lon_step,
            );
            ids.push(b.add_junction(pos));
        }
    }

    for row in 0..size {
        for col in 0..size {
            let here = ids[row * size + col];
            if col + 1 < size {
                let name = format!("Row {row}");
                b.connect(here, ids[row * size + col + 1], STREET_SPEED_MPS, Some(&name));
            }
            if row + 1 < size {
                let name = format!("Avenue {col}");
                b.connect(here, ids[(row + 1) * size + col], STREET_SPEED_MPS, Some(&name));
            }
        }
    }

    b.build()
}
