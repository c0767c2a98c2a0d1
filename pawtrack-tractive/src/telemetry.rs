//! Per-tracker telemetry fetch.
//!
//! Each tracker has two independent streams:
//! - the latest hardware report, which is best-effort and degrades to an
//!   empty report on any soft failure
//! - the position history over a trailing window, which is the primary
//!   payload and becomes "no history" on any soft failure
//!
//! Only transport failures are propagated.

use chrono::{DateTime, Duration, Utc};
use pawtrack_core::{Credential, HardwareReport, PositionPoint, PositionSegments, TrackerId};
use pawtrack_fetch::{FetchError, GatewayRequest};
use tracing::{debug, error, instrument, warn};

use crate::api::{TractiveApi, expect_ok};

/// Default length of the position history window.
pub const DEFAULT_WINDOW_HOURS: i64 = 6;

// ============================================================================
// Telemetry
// ============================================================================

/// Result of one telemetry fetch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Telemetry {
    /// Hardware report, empty if it could not be fetched.
    pub hardware: HardwareReport,
    /// Newest point of the first history segment, or an empty list if that
    /// segment had no points. `None` if no usable history came back.
    pub positions: Option<Vec<PositionPoint>>,
}

impl Telemetry {
    /// Returns true if a position history was received.
    pub fn has_positions(&self) -> bool {
        self.positions.is_some()
    }
}

// ============================================================================
// Fetcher
// ============================================================================

/// Fetches the hardware report and position history of a tracker.
#[derive(Debug, Clone)]
pub struct TelemetryFetcher {
    window: Duration,
}

impl Default for TelemetryFetcher {
    fn default() -> Self {
        Self {
            window: Duration::hours(DEFAULT_WINDOW_HOURS),
        }
    }
}

impl TelemetryFetcher {
    /// Creates a fetcher with the default six hour window.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetches telemetry for the window ending now.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Transport`] if either call could not reach the
    /// service.
    pub async fn fetch(
        &self,
        api: &TractiveApi,
        credential: &Credential,
        tracker: &TrackerId,
    ) -> Result<Telemetry, FetchError> {
        self.fetch_at(api, credential, tracker, Utc::now()).await
    }

    /// Fetches telemetry for the window ending at `now`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Transport`] if either call could not reach the
    /// service.
    #[instrument(skip(self, api, credential, tracker), fields(tracker = %tracker))]
    pub async fn fetch_at(
        &self,
        api: &TractiveApi,
        credential: &Credential,
        tracker: &TrackerId,
        now: DateTime<Utc>,
    ) -> Result<Telemetry, FetchError> {
        let hardware = self.hardware(api, credential, tracker).await?;
        let positions = self.positions(api, credential, tracker, now).await?;
        Ok(Telemetry {
            hardware,
            positions,
        })
    }

    async fn hardware(
        &self,
        api: &TractiveApi,
        credential: &Credential,
        tracker: &TrackerId,
    ) -> Result<HardwareReport, FetchError> {
        let request = api.authorized(GatewayRequest::get(api.hw_report_url(tracker)), credential);

        match fetch_body(api, request).await {
            Ok(body) => Ok(HardwareReport::from_json(&body).unwrap_or_else(|e| {
                warn!(error = %e, "Hardware report could not be parsed");
                HardwareReport::empty()
            })),
            Err(e) if e.is_fatal() => {
                error!(error = %e, "Error connecting to Tractive");
                Err(e)
            }
            Err(e) => {
                warn!(error = %e, "Error getting hardware report from Tractive");
                Ok(HardwareReport::empty())
            }
        }
    }

    async fn positions(
        &self,
        api: &TractiveApi,
        credential: &Credential,
        tracker: &TrackerId,
        now: DateTime<Utc>,
    ) -> Result<Option<Vec<PositionPoint>>, FetchError> {
        let time_to = now.timestamp();
        let time_from = (now - self.window).timestamp();
        let request = api.authorized(
            GatewayRequest::get(api.positions_url(tracker, time_from, time_to)),
            credential,
        );

        let body = match fetch_body(api, request).await {
            Ok(body) => body,
            Err(e) if e.is_fatal() => {
                error!(error = %e, "Error connecting to Tractive");
                return Err(e);
            }
            Err(e) => {
                warn!(error = %e, "Error getting positions from Tractive");
                return Ok(None);
            }
        };

        let segments = match PositionSegments::from_json(&body) {
            Ok(segments) if segments.is_empty() => {
                debug!("No position segments in window");
                return Ok(None);
            }
            Ok(segments) => segments,
            Err(e) => {
                warn!(error = %e, "Position history could not be parsed");
                return Ok(None);
            }
        };

        match segments.into_latest_point() {
            Ok(latest) => Ok(Some(latest.into_iter().collect())),
            Err(e) => {
                warn!(error = %e, "Newest position could not be parsed");
                Ok(None)
            }
        }
    }
}

async fn fetch_body(api: &TractiveApi, request: GatewayRequest) -> Result<String, FetchError> {
    api.send(request).await.and_then(expect_ok)
}

// ============================================================================
// Tests
// ============================================================================
