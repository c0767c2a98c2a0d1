//! Fused location records and the payload published to a sink.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::session::TrackerId;

/// Icon attached to every published location.
pub const DEFAULT_ICON: &str = "mdi:cat";

// ============================================================================
// Fused Record
// ============================================================================

/// A position sample merged with its hardware status.
///
/// `attributes` holds the remaining point fields (with `time` as an RFC 3339
/// string) plus the non-metadata hardware fields. It never contains
/// `latlong` or `sensor_used`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FusedRecord {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
    /// Source classifier taken from `sensor_used`.
    pub source_type: String,
    /// Battery level in percent, absent if the hardware report was empty.
    pub battery: Option<u8>,
    /// Time of the position fix.
    pub time: DateTime<Utc>,
    /// Remaining point and hardware fields.
    pub attributes: Map<String, Value>,
}

// ============================================================================
// Location Update
// ============================================================================

/// Payload handed to a [`LocationSink`](crate::LocationSink).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationUpdate {
    /// Tracker the location belongs to.
    pub device_id: TrackerId,
    /// Source classifier (`GPS`, `KNOWN_WIFI`, ...).
    pub source_type: String,
    /// `(latitude, longitude)`.
    pub gps: (f64, f64),
    /// Display icon.
    pub icon: String,
    /// Battery level in percent.
    pub battery: Option<u8>,
    /// Extra attributes.
    pub attributes: Map<String, Value>,
}

impl LocationUpdate {
    /// Builds the sink payload for a fused record.
    pub fn from_record(device_id: TrackerId, record: FusedRecord) -> Self {
        Self {
            device_id,
            source_type: record.source_type,
            gps: (record.latitude, record.longitude),
            icon: DEFAULT_ICON.to_string(),
            battery: record.battery,
            attributes: record.attributes,
        }
    }

    /// Latitude of the update.
    pub fn latitude(&self) -> f64 {
        self.gps.0
    }

    /// Longitude of the update.
    pub fn longitude(&self) -> f64 {
        self.gps.1
    }
}
