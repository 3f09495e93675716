//! CSV batch replay.
//!
//! # CSV format
//!
//! One row per vehicle per batch.  Batches are replayed in ascending
//! `batch` order; row order within a batch is preserved.
//!
//! ```csv
//! batch,vehicle_id,latitude,longitude,line,operator,destination
//! 0,EYMS-1,51.5079,-0.0877,X4,EYMS,City_Centre
//! 0,STNC-7,51.5101,-0.0850,12,STNC,Docks
//! 1,EYMS-1,51.5085,-0.0870,X4,EYMS,City_Centre
//! ```
//!
//! `line`, `operator`, and `destination` may be empty.  A row with a blank
//! id or an out-of-range coordinate is a parse error: recorded files are
//! expected to be clean, unlike the live feed.

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use serde::Deserialize;

use lm_core::{Bounds, EntityAttributes, EntitySnapshot, GeoPoint, SourceError};

use crate::{EntitySource, FeedError};

// ── CSV record ────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct BatchRecord {
    batch:       u32,
    vehicle_id:  String,
    latitude:    f64,
    longitude:   f64,
    #[serde(default)]
    line:        String,
    #[serde(default)]
    operator:    String,
    #[serde(default)]
    destination: String,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load snapshot batches from a CSV file.
pub fn load_batches_csv(path: &Path) -> Result<Vec<Vec<EntitySnapshot>>, FeedError> {
    let file = std::fs::File::open(path)?;
    load_batches_reader(file)
}

/// Like [`load_batches_csv`] but accepts any `Read` source.
///
/// Useful for testing (pass a `std::io::Cursor`) or loading from network
/// streams.  Missing batch numbers are skipped, not replayed as empty.
pub fn load_batches_reader<R: Read>(reader: R) -> Result<Vec<Vec<EntitySnapshot>>, FeedError> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut by_batch: BTreeMap<u32, Vec<EntitySnapshot>> = BTreeMap::new();

    for (line, result) in csv_reader.deserialize::<BatchRecord>().enumerate() {
        let row = result.map_err(|e| FeedError::Parse(e.to_string()))?;
        let attributes = EntityAttributes {
            line:        row.line,
            operator:    row.operator,
            destination: row.destination,
            timestamp:   None,
            extra:       Default::default(),
        };
        let snapshot = EntitySnapshot::new(
            row.vehicle_id,
            GeoPoint::new(row.latitude, row.longitude),
            attributes,
        )
        .map_err(|e| FeedError::Parse(format!("row {}: {e}", line + 1)))?;
        by_batch.entry(row.batch).or_default().push(snapshot);
    }

    Ok(by_batch.into_values().collect())
}

// ── ReplaySource ──────────────────────────────────────────────────────────────

/// Serves recorded batches, one per fetch, holding on the last batch once
/// the recording is exhausted.
pub struct ReplaySource {
    batches: Vec<Vec<EntitySnapshot>>,
    cursor:  Mutex<usize>,
}

impl ReplaySource {
    pub fn new(batches: Vec<Vec<EntitySnapshot>>) -> Self {
        Self { batches, cursor: Mutex::new(0) }
    }

    pub fn batch_count(&self) -> usize {
        self.batches.len()
    }

    /// Index of the batch the next fetch will serve.
    pub fn position(&self) -> usize {
        self.cursor.lock().map(|c| *c).unwrap_or(0)
    }
}

#[async_trait]
impl EntitySource for ReplaySource {
    async fn fetch(&self, bounds: Bounds) -> Result<Vec<EntitySnapshot>, SourceError> {
        let index = {
            let mut cursor = self
                .cursor
                .lock()
                .map_err(|_| SourceError::Network("replay cursor poisoned".into()))?;
            let index = (*cursor).min(self.batches.len().saturating_sub(1));
            *cursor = (*cursor + 1).min(self.batches.len());
            index
        };

        let Some(batch) = self.batches.get(index) else {
            return Ok(Vec::new());
        };
        Ok(batch.iter().filter(|e| bounds.contains(e.position())).cloned().collect())
    }
}
