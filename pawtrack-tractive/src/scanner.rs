//! Update cycle orchestration.
//!
//! The [`Scanner`] owns the credential and the tracker set. It starts
//! [`ScannerState::Unauthenticated`], moves to
//! [`ScannerState::Authenticated`] after a successful [`Scanner::start`],
//! and from then on every [`Scanner::run_cycle`] walks the trackers in
//! discovery order:
//!
//! ```text
//! fetch ── no history ──► re-login ──► fetch ── no history ──► skip
//!   │                                    │
//!   └──────────── history ───────────────┴──► fuse ──► sink
//! ```
//!
//! A cycle never fails. Everything that goes wrong for one tracker is
//! logged and recorded in the [`CycleReport`].

use pawtrack_core::{Credential, LocationSink, LocationUpdate, TrackerId};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

use crate::api::TractiveApi;
use crate::auth::CredentialManager;
use crate::directory::list_trackers;
use crate::error::ScannerError;
use crate::fuser::{Rejection, fuse};
use crate::telemetry::{Telemetry, TelemetryFetcher};

/// Default accuracy gate in meters.
pub const DEFAULT_MAX_GPS_ACCURACY: f64 = 100_000.0;

/// Telemetry fetches per tracker and cycle, the re-login retry included.
const FETCH_ATTEMPTS: u32 = 2;

// ============================================================================
// Options & State
// ============================================================================

/// Tunables for the scanner.
#[derive(Debug, Clone, PartialEq)]
pub struct ScannerOptions {
    /// Points with a larger uncertainty (meters) are rejected.
    pub max_gps_accuracy: f64,
}

impl Default for ScannerOptions {
    fn default() -> Self {
        Self {
            max_gps_accuracy: DEFAULT_MAX_GPS_ACCURACY,
        }
    }
}

/// Authentication state of the scanner.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ScannerState {
    /// No credential yet.
    #[default]
    Unauthenticated,
    /// Logged in with a resolved tracker set.
    Authenticated {
        /// Active credential.
        credential: Credential,
        /// Trackers in discovery order.
        trackers: Vec<TrackerId>,
    },
}

// ============================================================================
// Cycle Report
// ============================================================================

/// What happened to one tracker during a cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", content = "detail", rename_all = "snake_case")]
pub enum TrackerOutcome {
    /// A location was handed to the sink.
    Published,
    /// The fused point failed a data-quality check.
    Rejected(Rejection),
    /// No position history, even after the retry.
    NoData,
    /// The service could not be reached.
    Failed(String),
}

/// Summary of one update cycle.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CycleReport {
    /// Per-tracker outcomes in processing order.
    pub outcomes: Vec<(TrackerId, TrackerOutcome)>,
}

impl CycleReport {
    fn record(&mut self, tracker: TrackerId, outcome: TrackerOutcome) {
        self.outcomes.push((tracker, outcome));
    }

    /// Outcome for a tracker.
    pub fn outcome(&self, tracker: &TrackerId) -> Option<&TrackerOutcome> {
        self.outcomes
            .iter()
            .find(|(id, _)| id == tracker)
            .map(|(_, outcome)| outcome)
    }

    /// Number of trackers published.
    pub fn published(&self) -> usize {
        self.count(|o| matches!(o, TrackerOutcome::Published))
    }

    /// Number of trackers rejected by the fuser.
    pub fn rejected(&self) -> usize {
        self.count(|o| matches!(o, TrackerOutcome::Rejected(_)))
    }

    /// Number of trackers without position history.
    pub fn no_data(&self) -> usize {
        self.count(|o| matches!(o, TrackerOutcome::NoData))
    }

    /// Number of trackers that hit a transport failure.
    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, TrackerOutcome::Failed(_)))
    }

    /// Returns true if no tracker was processed.
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    fn count(&self, pred: impl Fn(&TrackerOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|(_, o)| pred(o)).count()
    }
}

// ============================================================================
// Scanner
// ============================================================================

/// Polls the Tractive service and publishes tracker locations.
pub struct Scanner {
    api: TractiveApi,
    auth: CredentialManager,
    telemetry: TelemetryFetcher,
    sink: Arc<dyn LocationSink>,
    options: ScannerOptions,
    state: ScannerState,
}

impl Scanner {
    /// Creates an unauthenticated scanner.
    pub fn new(
        api: TractiveApi,
        auth: CredentialManager,
        sink: Arc<dyn LocationSink>,
        options: ScannerOptions,
    ) -> Self {
        Self {
            api,
            auth,
            telemetry: TelemetryFetcher::new(),
            sink,
            options,
            state: ScannerState::Unauthenticated,
        }
    }

    /// Current state.
    pub fn state(&self) -> &ScannerState {
        &self.state
    }

    /// Returns true once [`start`](Self::start) has succeeded.
    pub fn is_authenticated(&self) -> bool {
        matches!(self.state, ScannerState::Authenticated { .. })
    }

    /// Discovered trackers, empty before startup.
    pub fn trackers(&self) -> &[TrackerId] {
        match &self.state {
            ScannerState::Authenticated { trackers, .. } => trackers,
            ScannerState::Unauthenticated => &[],
        }
    }

    fn credential(&self) -> Option<&Credential> {
        match &self.state {
            ScannerState::Authenticated { credential, .. } => Some(credential),
            ScannerState::Unauthenticated => None,
        }
    }

    /// Logs in and resolves the tracker set.
    ///
    /// Calling this again once authenticated does nothing.
    ///
    /// # Errors
    ///
    /// Returns [`ScannerError`] if login or discovery fails; the scanner
    /// then stays unauthenticated.
    #[instrument(skip(self))]
    pub async fn start(&mut self) -> Result<&[TrackerId], ScannerError> {
        if !self.is_authenticated() {
            let credential = self
                .auth
                .login(&self.api)
                .await
                .map_err(ScannerError::Login)?;

            let trackers = list_trackers(&self.api, &credential)
                .await
                .map_err(ScannerError::Directory)?;

            info!(count = trackers.len(), "Scanner started");
            self.state = ScannerState::Authenticated {
                credential,
                trackers,
            };
        }
        Ok(self.trackers())
    }

    /// Runs one polling pass over every tracker.
    #[instrument(skip(self))]
    pub async fn run_cycle(&mut self) -> CycleReport {
        let mut report = CycleReport::default();
        if !self.is_authenticated() {
            warn!("Update cycle skipped, scanner is not started");
            return report;
        }

        for tracker in self.trackers().to_vec() {
            let outcome = self.update_tracker(&tracker).await;
            report.record(tracker, outcome);
        }

        info!(
            published = report.published(),
            rejected = report.rejected(),
            no_data = report.no_data(),
            failed = report.failed(),
            "Update cycle finished"
        );
        report
    }

    #[instrument(skip(self, tracker), fields(tracker = %tracker))]
    async fn update_tracker(&mut self, tracker: &TrackerId) -> TrackerOutcome {
        let mut history = None;

        for attempt in 1..=FETCH_ATTEMPTS {
            if attempt > 1 {
                self.refresh_credential().await;
            }
            let Some(credential) = self.credential() else {
                return TrackerOutcome::Failed("not authenticated".to_string());
            };

            match self.telemetry.fetch(&self.api, credential, tracker).await {
                Ok(Telemetry {
                    hardware,
                    positions: Some(points),
                }) => {
                    history = Some((hardware, points));
                    break;
                }
                Ok(_) => debug!(attempt, "No position history"),
                Err(e) => {
                    error!(error = %e, "Tracker update failed");
                    return TrackerOutcome::Failed(e.to_string());
                }
            }
        }

        let Some((hardware, points)) = history else {
            warn!("No data for tracker");
            return TrackerOutcome::NoData;
        };

        match fuse(hardware, points, self.options.max_gps_accuracy) {
            Ok(record) => {
                let update = LocationUpdate::from_record(tracker.clone(), record);
                debug!(lat = update.latitude(), lon = update.longitude(), "Publishing location");
                self.sink.see(update).await;
                TrackerOutcome::Published
            }
            Err(rejection) => {
                warn!(reason = %rejection, "Skipping position");
                TrackerOutcome::Rejected(rejection)
            }
        }
    }

    /// Logs in again; on failure the current credential stays in place.
    async fn refresh_credential(&mut self) {
        match self.auth.login(&self.api).await {
            Ok(fresh) => {
                if let ScannerState::Authenticated { credential, .. } = &mut self.state {
                    *credential = fresh;
                }
            }
            Err(e) => warn!(error = %e, "Re-login failed, retrying with current token"),
        }
    }
}

impl fmt::Debug for Scanner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scanner")
            .field("api", &self.api)
            .field("auth", &self.auth)
            .field("options", &self.options)
            .field("trackers", &self.trackers())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_counts() {
        let mut report = CycleReport::default();
        report.record(TrackerId::from("A"), TrackerOutcome::Published);
        report.record(TrackerId::from("B"), TrackerOutcome::Rejected(Rejection::NoPoints));
        report.record(TrackerId::from("C"), TrackerOutcome::NoData);
        report.record(TrackerId::from("D"), TrackerOutcome::Failed("down".into()));

        assert_eq!(report.published(), 1);
        assert_eq!(report.rejected(), 1);
        assert_eq!(report.no_data(), 1);
        assert_eq!(report.failed(), 1);
        assert_eq!(
            report.outcome(&TrackerId::from("C")),
            Some(&TrackerOutcome::NoData)
        );
        assert_eq!(report.outcome(&TrackerId::from("Z")), None);
    }

    #[test]
    fn test_outcome_serialization() {
        let json = serde_json::to_value(TrackerOutcome::Rejected(Rejection::NoPoints)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"outcome": "rejected", "detail": "no_points"})
        );
    }

    #[test]
    fn test_default_options() {
        assert_eq!(ScannerOptions::default().max_gps_accuracy, 100_000.0);
    }
}
