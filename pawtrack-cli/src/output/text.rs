//! Text output formatting with colors.

use chrono::{DateTime, Local, Utc};
use pawtrack_core::{LocationUpdate, TrackerId};
use pawtrack_store::{Config, SeenLocation};
use pawtrack_tractive::{CycleReport, TrackerOutcome};
use std::path::Path;

// ============================================================================
// ANSI Colors
// ============================================================================

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";

/// Width of the tracker id column.
const ID_WIDTH: usize = 12;

/// Text formatter with optional colors.
pub struct TextFormatter {
    use_colors: bool,
}

impl TextFormatter {
    /// Creates a new text formatter.
    pub fn new(use_colors: bool) -> Self {
        Self { use_colors }
    }

    // ========================================================================
    // Cycles
    // ========================================================================

    /// Formats the outcome of one update cycle.
    pub fn format_cycle(
        &self,
        report: &CycleReport,
        locations: &[SeenLocation],
        at: DateTime<Utc>,
    ) -> String {
        let mut lines = Vec::new();

        let time = at.with_timezone(&Local).format("%H:%M:%S");
        lines.push(format!(
            "{} {}",
            self.bold(&format!("Cycle at {time}")),
            self.dim(&format!(
                "({} published, {} rejected, {} no data, {} failed)",
                report.published(),
                report.rejected(),
                report.no_data(),
                report.failed()
            ))
        ));

        if report.is_empty() {
            lines.push(self.dim("  no trackers"));
        }

        for (tracker, outcome) in &report.outcomes {
            let location = locations
                .iter()
                .find(|seen| &seen.update.device_id == tracker)
                .map(|seen| &seen.update);
            lines.push(self.format_outcome(tracker, outcome, location));
        }

        lines.join("\n")
    }

    fn format_outcome(
        &self,
        tracker: &TrackerId,
        outcome: &TrackerOutcome,
        location: Option<&LocationUpdate>,
    ) -> String {
        let id = format!("{:<ID_WIDTH$}", tracker.as_str());
        match (outcome, location) {
            (TrackerOutcome::Published, Some(update)) => {
                format!("  {id} {} {}", self.green("✓"), self.format_location(update))
            }
            (TrackerOutcome::Published, None) => format!("  {id} {}", self.green("✓")),
            (TrackerOutcome::Rejected(rejection), _) => {
                format!("  {id} {} {}", self.yellow("✗"), self.yellow(&rejection.to_string()))
            }
            (TrackerOutcome::NoData, _) => format!("  {id} {} {}", self.dim("-"), self.dim("no data")),
            (TrackerOutcome::Failed(error), _) => {
                format!("  {id} {} {}", self.red("✗"), self.red(error))
            }
        }
    }

    /// Formats a single location as `lat, lon  SOURCE  battery N%`.
    pub fn format_location(&self, update: &LocationUpdate) -> String {
        let mut out = format!(
            "{:.5}, {:.5}  {}",
            update.latitude(),
            update.longitude(),
            update.source_type
        );
        if let Some(battery) = update.battery {
            let level = format!("battery {battery}%");
            out.push_str("  ");
            out.push_str(&if battery < 20 {
                self.red(&level)
            } else {
                self.dim(&level)
            });
        }
        if let Some(serde_json::Value::String(time)) = update.attributes.get("time") {
            out.push_str("  ");
            out.push_str(&self.dim(time));
        }
        out
    }

    // ========================================================================
    // Trackers & Config
    // ========================================================================

    /// Formats the tracker list.
    pub fn format_trackers(&self, trackers: &[TrackerId]) -> String {
        if trackers.is_empty() {
            return self.dim("No trackers on this account");
        }
        let mut lines = vec![self.bold(&format!("{} tracker(s)", trackers.len()))];
        lines.extend(trackers.iter().map(|t| format!("  • {t}")));
        lines.join("\n")
    }

    /// Formats the effective configuration; the password is never shown.
    pub fn format_config(&self, config: &Config, path: &Path, password_source: &str) -> String {
        let lines = [
            self.bold("pawtrack Configuration"),
            "─".repeat(40),
            format!("Config file:      {}", path.display()),
            format!("Username:         {}", or_unset(&config.username)),
            format!("Password:         {password_source}"),
            format!("Max GPS accuracy: {} m", config.max_gps_accuracy),
            format!("Scan interval:    {} s", config.scan_interval),
            format!("Timeout:          {} s", config.timeout),
            format!(
                "API base:         {}",
                config.api_base.as_deref().unwrap_or(pawtrack_tractive::API_BASE)
            ),
        ];
        lines.join("\n")
    }

    // ========================================================================
    // Colors
    // ========================================================================

    fn paint(&self, code: &str, text: &str) -> String {
        if self.use_colors {
            format!("{code}{text}{RESET}")
        } else {
            text.to_string()
        }
    }

    fn bold(&self, text: &str) -> String {
        self.paint(BOLD, text)
    }

    fn dim(&self, text: &str) -> String {
        self.paint(DIM, text)
    }

    fn green(&self, text: &str) -> String {
        self.paint(GREEN, text)
    }

    fn yellow(&self, text: &str) -> String {
        self.paint(YELLOW, text)
    }

    fn red(&self, text: &str) -> String {
        self.paint(RED, text)
    }
}

fn or_unset(value: &str) -> &str {
    if value.is_empty() { "(not set)" } else { value }
}
