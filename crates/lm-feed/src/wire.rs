//! Parsing of the vehicle-feed JSON response.
//!
//! ```json
//! {
//!   "vehicles": [
//!     { "vehicle_id": "EYMS-1", "latitude": 51.50, "longitude": -0.08,
//!       "line": "X4", "operator": "EYMS", "destination": "City_Centre",
//!       "timestamp": "2024-01-01T12:00:00+00:00" }
//!   ],
//!   "vehicle_count": 812,
//!   "cap_threshold": 5000,
//!   "rate_remaining": 291
//! }
//! ```
//!
//! Records are validated one by one.  A record with a missing id or an
//! impossible coordinate is dropped and counted in
//! [`VehiclesResponse::rejected`]; only a response that is not this shape
//! at all is a [`SourceError::Malformed`].

use serde::Deserialize;

use lm_core::{EntityAttributes, EntitySnapshot, GeoPoint, SourceError};

#[derive(Deserialize)]
struct RawResponse {
    vehicles:       Option<Vec<serde_json::Value>>,
    vehicle_count:  Option<u64>,
    cap_threshold:  Option<u64>,
    rate_remaining: Option<u64>,
    #[serde(default)]
    cap_required:   bool,
    reason:         Option<String>,
}

#[derive(Deserialize)]
struct RawVehicle {
    vehicle_id:  String,
    latitude:    f64,
    longitude:   f64,
    #[serde(default)]
    line:        String,
    #[serde(default)]
    operator:    String,
    #[serde(default)]
    destination: String,
    timestamp:   Option<String>,
}

/// A parsed and validated feed response.
#[derive(Clone, Debug, Default)]
pub struct VehiclesResponse {
    pub vehicles:       Vec<EntitySnapshot>,
    /// Records dropped during validation.
    pub rejected:       usize,
    /// Upstream total before server-side capping, if reported.
    pub vehicle_count:  Option<u64>,
    pub cap_threshold:  Option<u64>,
    pub rate_remaining: Option<u64>,
}

/// Parse a feed response body.
///
/// A body flagged `cap_required` is reported as a network failure: the
/// session gate is outside the engine and the data is simply unavailable.
pub fn parse_vehicles_json(body: &str) -> Result<VehiclesResponse, SourceError> {
    let raw: RawResponse =
        serde_json::from_str(body).map_err(|e| SourceError::Malformed(e.to_string()))?;

    if raw.cap_required {
        let reason = raw.reason.unwrap_or_else(|| "unspecified".into());
        return Err(SourceError::Network(format!("session challenge required ({reason})")));
    }

    let records = raw
        .vehicles
        .ok_or_else(|| SourceError::Malformed("missing `vehicles` array".into()))?;

    let mut vehicles = Vec::with_capacity(records.len());
    let mut rejected = 0;
    for value in records {
        match parse_vehicle(value) {
            Some(v) => vehicles.push(v),
            None => rejected += 1,
        }
    }
    if rejected > 0 {
        tracing::debug!(rejected, kept = vehicles.len(), "dropped invalid vehicle records");
    }

    Ok(VehiclesResponse {
        vehicles,
        rejected,
        vehicle_count:  raw.vehicle_count,
        cap_threshold:  raw.cap_threshold,
        rate_remaining: raw.rate_remaining,
    })
}

fn parse_vehicle(value: serde_json::Value) -> Option<EntitySnapshot> {
    let raw: RawVehicle = serde_json::from_value(value).ok()?;
    let attributes = EntityAttributes {
        line:        raw.line,
        operator:    raw.operator,
        destination: raw.destination,
        timestamp:   raw.timestamp,
        extra:       Default::default(),
    };
    EntitySnapshot::new(raw.vehicle_id, GeoPoint::new(raw.latitude, raw.longitude), attributes).ok()
}
