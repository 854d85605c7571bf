//! # Overdue Analyzer
//!
//! Judges whether a package has outstayed its current status, comparing
//! elapsed dwell time against the catalog's expectation. The result feeds
//! the rule engine (expedite warnings) and operational dashboards.
//!
//! Missing timeline data is a soft condition, not a failure: operational
//! tooling must keep working for packages whose history is incomplete, so
//! the analyzer returns a non-overdue report that says why instead of
//! erroring. The report's `timeline_found` flag lets callers distinguish
//! "on schedule" from "no data".

use serde::{Deserialize, Serialize};

use wharf_core::Timestamp;

use crate::history::{latest_entry_for_status, StatusHistoryEntry};
use crate::package::Package;
use crate::status::PackageStatus;

/// Dwell-time verdict for a package in its current status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverdueReport {
    /// Whether the package has exceeded its expected dwell time.
    pub is_overdue: bool,
    /// Hours spent in the current status; `0.0` when no timeline exists.
    pub elapsed_hours: f64,
    /// Hours past the expectation; `0.0` when not overdue.
    pub overdue_by_hours: f64,
    /// Whether a history entry for the current status was found. When
    /// `false`, the verdict is the soft "no data" outcome.
    pub timeline_found: bool,
    /// The catalog's next status, as an operator hint.
    pub recommended_next_status: Option<PackageStatus>,
    /// Human-readable guidance for operations staff.
    pub recommendation: String,
}

impl OverdueReport {
    fn on_schedule(status: PackageStatus, elapsed_hours: f64) -> Self {
        Self {
            is_overdue: false,
            elapsed_hours,
            overdue_by_hours: 0.0,
            timeline_found: true,
            recommended_next_status: status.next(),
            recommendation: format!(
                "package has been in {status} for {elapsed_hours:.1}h; within expectation"
            ),
        }
    }

    fn overdue(status: PackageStatus, elapsed_hours: f64, overdue_by_hours: f64) -> Self {
        let recommendation = match status.next() {
            Some(next) => format!(
                "package overdue in {status} by {overdue_by_hours:.1}h; advance toward {next}"
            ),
            None => format!("package overdue in {status} by {overdue_by_hours:.1}h"),
        };
        Self {
            is_overdue: true,
            elapsed_hours,
            overdue_by_hours,
            timeline_found: true,
            recommended_next_status: status.next(),
            recommendation,
        }
    }

    fn no_timeline(status: PackageStatus) -> Self {
        Self {
            is_overdue: false,
            elapsed_hours: 0.0,
            overdue_by_hours: 0.0,
            timeline_found: false,
            recommended_next_status: status.next(),
            recommendation: format!(
                "no history entry records when the package entered {status}; \
                 dwell time cannot be judged"
            ),
        }
    }

    fn terminal(status: PackageStatus) -> Self {
        Self {
            is_overdue: false,
            elapsed_hours: 0.0,
            overdue_by_hours: 0.0,
            timeline_found: true,
            recommended_next_status: None,
            recommendation: format!("package is {status}; no onward movement expected"),
        }
    }
}

/// Computes dwell-time verdicts from the status catalog and history.
#[derive(Debug, Clone, Copy, Default)]
pub struct OverdueAnalyzer;

impl OverdueAnalyzer {
    /// Judge the package's dwell in its current status as of `as_of`.
    ///
    /// Finds the most recent history entry for the current status, compares
    /// elapsed hours against the catalog expectation, and reports. Terminal
    /// statuses and missing history both produce non-overdue reports.
    pub fn analyze(
        &self,
        package: &Package,
        history: &[StatusHistoryEntry],
        as_of: Timestamp,
    ) -> OverdueReport {
        let status = package.status;
        let descriptor = status.describe();

        let Some(expected_hours) = descriptor.expected_dwell_hours else {
            return OverdueReport::terminal(status);
        };

        let Some(entry) = latest_entry_for_status(history, status) else {
            return OverdueReport::no_timeline(status);
        };

        let elapsed = as_of.hours_since(entry.timestamp);
        if elapsed > expected_hours {
            OverdueReport::overdue(status, elapsed, elapsed - expected_hours)
        } else {
            OverdueReport::on_schedule(status, elapsed.max(0.0))
        }
    }
}
