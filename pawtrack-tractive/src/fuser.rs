//! Point fusion and the accuracy gate.
//!
//! [`fuse`] turns a hardware report plus a position history into a single
//! [`FusedRecord`]. It is pure: identical inputs always give identical
//! records.

use chrono::{DateTime, SecondsFormat, Utc};
use pawtrack_core::{FusedRecord, HardwareReport, PositionPoint};
use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// Point fields that are lifted out of the attribute map.
const LIFTED_FIELDS: [&str; 2] = ["latlong", "sensor_used"];

// ============================================================================
// Rejection
// ============================================================================

/// Data-quality outcome that keeps a tracker from being published.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Rejection {
    /// The position history was empty.
    NoPoints,
    /// The newest point is less accurate than allowed.
    LowAccuracy {
        /// Uncertainty of the newest point in meters.
        uncertainty: f64,
        /// Configured maximum in meters.
        max: f64,
    },
    /// The newest point carries a timestamp outside the calendar range.
    InvalidTimestamp(i64),
}

impl Rejection {
    /// Short reason used in logs and reports.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::NoPoints => "no points",
            Self::LowAccuracy { .. } => "low accuracy",
            Self::InvalidTimestamp(_) => "invalid timestamp",
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoPoints => f.write_str(self.reason()),
            Self::LowAccuracy { uncertainty, max } => {
                write!(f, "{} ({uncertainty} m > {max} m)", self.reason())
            }
            Self::InvalidTimestamp(time) => write!(f, "{} ({time})", self.reason()),
        }
    }
}

// ============================================================================
// Fusion
// ============================================================================

/// Fuses the newest point with the hardware report.
///
/// The last element of `points` is used as-is; the list is not sorted.
/// A point passes the gate when its uncertainty is at most `max_accuracy`.
///
/// # Errors
///
/// Returns a [`Rejection`] when there is nothing publishable.
pub fn fuse(
    report: HardwareReport,
    mut points: Vec<PositionPoint>,
    max_accuracy: f64,
) -> Result<FusedRecord, Rejection> {
    let point = points.pop().ok_or(Rejection::NoPoints)?;

    let uncertainty = point.uncertainty();
    if uncertainty > max_accuracy {
        return Err(Rejection::LowAccuracy {
            uncertainty,
            max: max_accuracy,
        });
    }

    let time = DateTime::<Utc>::from_timestamp(point.time, 0)
        .ok_or(Rejection::InvalidTimestamp(point.time))?;

    let battery = report.battery_level();
    let latitude = point.latitude();
    let longitude = point.longitude();

    let mut attributes = report.into_attributes();
    attributes.extend(point.extra);
    attributes.insert(
        "pos_uncertainty".to_string(),
        Value::Number(point.pos_uncertainty),
    );
    attributes.insert(
        "time".to_string(),
        Value::String(time.to_rfc3339_opts(SecondsFormat::Secs, true)),
    );
    for field in LIFTED_FIELDS {
        attributes.remove(field);
    }

    Ok(FusedRecord {
        latitude,
        longitude,
        source_type: point.sensor_used,
        battery,
        time,
        attributes,
    })
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pawtrack_core::METADATA_FIELDS;
    use serde_json::{Number, json};

    fn report() -> HardwareReport {
        HardwareReport::from_json(
            &json!({
                "_id": "T1",
                "_type": "device_hw_report",
                "report_id": "r9",
                "time": 1_699_999_000,
                "battery_level": 64,
                "clip_mounted_state": "unknown"
            })
            .to_string(),
        )
        .unwrap()
    }

    fn point(uncertainty: f64) -> PositionPoint {
        PositionPoint::new(
            48.2,
            16.37,
            Number::from_f64(uncertainty).unwrap(),
            "GPS",
            1_700_000_000,
        )
    }

    #[test]
    fn test_empty_points_rejected_regardless_of_report() {
        assert_eq!(fuse(report(), Vec::new(), 100.0), Err(Rejection::NoPoints));
        assert_eq!(
            fuse(HardwareReport::empty(), Vec::new(), 100.0),
            Err(Rejection::NoPoints)
        );
    }

    #[test]
    fn test_accuracy_gate_boundary() {
        assert!(fuse(report(), vec![point(100.0)], 100.0).is_ok());
        assert!(fuse(report(), vec![point(99.9)], 100.0).is_ok());

        let rejected = fuse(report(), vec![point(100.1)], 100.0).unwrap_err();
        assert_eq!(rejected.reason(), "low accuracy");
    }

    #[test]
    fn test_uses_last_point_without_sorting() {
        let newest = PositionPoint::new(1.0, 2.0, Number::from(5_u32), "KNOWN_WIFI", 1_600_000_000);
        let record = fuse(report(), vec![point(5.0), newest], 100.0).unwrap();

        assert_eq!((record.latitude, record.longitude), (1.0, 2.0));
        assert_eq!(record.source_type, "KNOWN_WIFI");
    }

    #[test]
    fn test_gate_applies_to_last_point_only() {
        let result = fuse(report(), vec![point(5.0), point(500.0)], 100.0);
        assert!(matches!(result, Err(Rejection::LowAccuracy { .. })));
    }

    #[test]
    fn test_latlong_unpacked_and_removed() {
        let record = fuse(report(), vec![point(10.0)], 100.0).unwrap();

        assert_eq!(record.latitude, 48.2);
        assert_eq!(record.longitude, 16.37);
        assert!(!record.attributes.contains_key("latlong"));
        assert!(!record.attributes.contains_key("sensor_used"));
    }

    #[test]
    fn test_identifier_fields_stripped() {
        let record = fuse(report(), vec![point(10.0)], 100.0).unwrap();

        for field in ["_id", "_type", "report_id"] {
            assert!(!record.attributes.contains_key(field));
        }
        assert_eq!(record.attributes["clip_mounted_state"], json!("unknown"));
        assert_eq!(record.attributes["battery_level"], json!(64));
        assert_eq!(record.battery, Some(64));
        assert!(METADATA_FIELDS.contains(&"time"));
    }

    #[test]
    fn test_time_is_point_time() {
        let record = fuse(report(), vec![point(10.0)], 100.0).unwrap();

        assert_eq!(record.time.timestamp(), 1_700_000_000);
        assert_eq!(record.attributes["time"], json!("2023-11-14T22:13:20Z"));
    }

    #[test]
    fn test_point_fields_win_on_collision() {
        let report = HardwareReport::from_json(r#"{"speed": 0, "battery_level": 10}"#).unwrap();
        let mut moving = point(10.0);
        moving.extra.insert("speed".to_string(), json!(3.5));

        let record = fuse(report, vec![moving], 100.0).unwrap();
        assert_eq!(record.attributes["speed"], json!(3.5));
    }

    #[test]
    fn test_uncertainty_keeps_wire_value() {
        let whole = PositionPoint::new(48.2, 16.37, Number::from(12_u32), "GPS", 1_700_000_000);
        let record = fuse(report(), vec![whole], 100.0).unwrap();
        assert_eq!(serde_json::to_string(&record.attributes["pos_uncertainty"]).unwrap(), "12");

        let record = fuse(report(), vec![point(7.5)], 100.0).unwrap();
        assert_eq!(record.attributes["pos_uncertainty"], json!(7.5));
    }

    #[test]
    fn test_empty_report_has_no_battery() {
        let record = fuse(HardwareReport::empty(), vec![point(10.0)], 100.0).unwrap();
        assert_eq!(record.battery, None);
        assert!(!record.attributes.contains_key("battery_level"));
    }

    #[test]
    fn test_fusion_is_deterministic() {
        let mut p = point(42.0);
        p.extra.insert("altitude".to_string(), json!(180));
        p.extra.insert("course".to_string(), json!(90));

        let a = fuse(report(), vec![p.clone()], 100.0).unwrap();
        let b = fuse(report(), vec![p], 100.0).unwrap();
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }

    #[test]
    fn test_out_of_range_timestamp_rejected() {
        let bad = PositionPoint::new(0.0, 0.0, Number::from(1_u32), "GPS", i64::MAX);
        assert_eq!(
            fuse(report(), vec![bad], 100.0),
            Err(Rejection::InvalidTimestamp(i64::MAX))
        );
    }

    #[test]
    fn test_rejection_display() {
        let rejection = Rejection::LowAccuracy {
            uncertainty: 150.0,
            max: 100.0,
        };
        assert_eq!(rejection.to_string(), "low accuracy (150 m > 100 m)");
        assert_eq!(Rejection::NoPoints.to_string(), "no points");
    }
}
