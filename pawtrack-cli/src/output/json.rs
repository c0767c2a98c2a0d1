//! JSON output formatting.

use anyhow::Result;
use chrono::{DateTime, Utc};
use pawtrack_core::{LocationUpdate, TrackerId};
use pawtrack_store::SeenLocation;
use pawtrack_tractive::{CycleReport, TrackerOutcome};
use serde::Serialize;

// ============================================================================
// Output Types
// ============================================================================

/// JSON output for one update cycle.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleOutput<'a> {
    pub finished_at: DateTime<Utc>,
    pub published: usize,
    pub rejected: usize,
    pub no_data: usize,
    pub failed: usize,
    pub trackers: Vec<TrackerOutput<'a>>,
}

/// JSON output for one tracker.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackerOutput<'a> {
    pub id: &'a TrackerId,
    #[serde(flatten)]
    pub outcome: &'a TrackerOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<&'a LocationUpdate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seen_at: Option<DateTime<Utc>>,
}

// ============================================================================
// JSON Formatter
// ============================================================================

/// JSON formatter.
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    /// Creates a new JSON formatter.
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    /// Formats any serializable data.
    pub fn format<T: Serialize>(&self, data: &T) -> Result<String> {
        let json = if self.pretty {
            serde_json::to_string_pretty(data)?
        } else {
            serde_json::to_string(data)?
        };
        Ok(json)
    }

    /// Formats the outcome of one update cycle.
    pub fn format_cycle(
        &self,
        report: &CycleReport,
        locations: &[SeenLocation],
        at: DateTime<Utc>,
    ) -> Result<String> {
        let trackers = report
            .outcomes
            .iter()
            .map(|(id, outcome)| {
                let seen = matches!(outcome, TrackerOutcome::Published)
                    .then(|| locations.iter().find(|s| &s.update.device_id == id))
                    .flatten();
                TrackerOutput {
                    id,
                    outcome,
                    location: seen.map(|s| &s.update),
                    seen_at: seen.map(|s| s.seen_at),
                }
            })
            .collect();

        self.format(&CycleOutput {
            finished_at: at,
            published: report.published(),
            rejected: report.rejected(),
            no_data: report.no_data(),
            failed: report.failed(),
            trackers,
        })
    }

    /// Formats the tracker list.
    pub fn format_trackers(&self, trackers: &[TrackerId]) -> Result<String> {
        self.format(&serde_json::json!({ "trackers": trackers }))
    }
}
