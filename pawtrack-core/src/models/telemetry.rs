//! Raw telemetry payloads returned by the tracker service.
//!
//! Two independent streams exist per tracker:
//! - [`HardwareReport`] - battery and device status, best-effort
//! - [`PositionSegments`] - position history, the primary payload
//!
//! # Position Response Format
//!
//! ```json
//! [
//!   [
//!     {"latlong": [48.2, 16.3], "pos_uncertainty": 12, "sensor_used": "GPS", "time": 1700000000},
//!     {"latlong": [48.3, 16.4], "pos_uncertainty": 8, "sensor_used": "GPS", "time": 1700000300}
//!   ]
//! ]
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use crate::error::CoreError;

/// Identifier and metadata fields stripped from a hardware report before fusion.
pub const METADATA_FIELDS: [&str; 4] = ["_id", "_type", "report_id", "time"];

// ============================================================================
// Hardware Report
// ============================================================================

/// Hardware status report for one tracker.
///
/// Kept as a JSON object so that every non-metadata field can be carried
/// through to the published attributes. An empty report stands in for a
/// failed hardware fetch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HardwareReport(Map<String, Value>);

impl HardwareReport {
    /// Creates an empty report.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parses a hardware report response body.
    ///
    /// # Errors
    ///
    /// Returns an error if the body is not a JSON object.
    pub fn from_json(body: &str) -> Result<Self, CoreError> {
        match serde_json::from_str::<Value>(body)? {
            Value::Object(fields) => Ok(Self(fields)),
            other => Err(CoreError::InvalidData(format!(
                "hardware report is not an object: {other}"
            ))),
        }
    }

    /// Returns true if the report has no fields.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns a field by name.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Battery level in percent, if reported.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn battery_level(&self) -> Option<u8> {
        let value = self.0.get("battery_level")?;
        if let Some(level) = value.as_u64() {
            return u8::try_from(level.min(100)).ok();
        }
        value
            .as_f64()
            .filter(|level| level.is_finite())
            .map(|level| level.round().clamp(0.0, 100.0) as u8)
    }

    /// Consumes the report, returning its fields without [`METADATA_FIELDS`].
    pub fn into_attributes(mut self) -> Map<String, Value> {
        for field in METADATA_FIELDS {
            self.0.remove(field);
        }
        self.0
    }
}

// ============================================================================
// Position Point
// ============================================================================

/// A single sample from the position history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionPoint {
    /// Packed `[latitude, longitude]` pair.
    pub latlong: [f64; 2],
    /// Reported uncertainty radius in meters, as sent on the wire.
    pub pos_uncertainty: Number,
    /// Sensor that produced the fix (`GPS`, `KNOWN_WIFI`, ...).
    pub sensor_used: String,
    /// Unix timestamp in seconds.
    pub time: i64,
    /// Any other fields the service sends (altitude, speed, course, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PositionPoint {
    /// Creates a point with no extra fields.
    pub fn new(
        latitude: f64,
        longitude: f64,
        pos_uncertainty: Number,
        sensor_used: &str,
        time: i64,
    ) -> Self {
        Self {
            latlong: [latitude, longitude],
            pos_uncertainty,
            sensor_used: sensor_used.to_string(),
            time,
            extra: Map::new(),
        }
    }

    /// Latitude part of `latlong`.
    pub fn latitude(&self) -> f64 {
        self.latlong[0]
    }

    /// Longitude part of `latlong`.
    pub fn longitude(&self) -> f64 {
        self.latlong[1]
    }

    /// Uncertainty radius in meters.
    pub fn uncertainty(&self) -> f64 {
        self.pos_uncertainty.as_f64().unwrap_or(f64::INFINITY)
    }
}

// ============================================================================
// Position Segments
// ============================================================================

/// Position history as returned with `format=json_segments`.
///
/// Segments are kept as raw JSON. Only the newest point of the first
/// segment is ever read, so malformed points elsewhere do not matter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PositionSegments(Vec<Value>);

impl PositionSegments {
    /// Parses a position history response body.
    ///
    /// # Errors
    ///
    /// Returns an error if the body is not a JSON array.
    pub fn from_json(body: &str) -> Result<Self, CoreError> {
        Ok(serde_json::from_str(body)?)
    }

    /// Returns true if the response contained no segments at all.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consumes the segments, returning the last point of the first one.
    ///
    /// The service orders points oldest first; nothing is sorted. Returns
    /// `Ok(None)` when there are no segments or the first one is empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the first segment is not an array or its last
    /// element is not a valid point.
    pub fn into_latest_point(self) -> Result<Option<PositionPoint>, CoreError> {
        let Some(first) = self.0.into_iter().next() else {
            return Ok(None);
        };
        let mut points = match first {
            Value::Array(points) => points,
            other => {
                return Err(CoreError::InvalidData(format!(
                    "position segment is not an array: {other}"
                )));
            }
        };
        points
            .pop()
            .map(serde_json::from_value::<PositionPoint>)
            .transpose()
            .map_err(CoreError::from)
    }
}
