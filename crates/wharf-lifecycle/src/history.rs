//! # Status History
//!
//! The append-only audit trail of package status transitions. One entry is
//! written per accepted transition; entries are never mutated or deleted.
//! Both the overdue analyzer and the rule engine reason over this timeline.

use serde::{Deserialize, Serialize};

use wharf_core::{ActorRole, PackageId, Timestamp};

use crate::status::PackageStatus;

/// One accepted status transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusHistoryEntry {
    /// The package this entry belongs to.
    pub package_id: PackageId,
    /// The status the package entered.
    pub status: PackageStatus,
    /// When the transition was accepted.
    pub timestamp: Timestamp,
    /// The role that performed the transition.
    pub actor: ActorRole,
    /// Free-form reason supplied with the transition, if any.
    pub reason: Option<String>,
    /// Where the transition was recorded (facility or scan point), if known.
    pub location: Option<String>,
}

impl StatusHistoryEntry {
    /// Build an entry for a transition accepted now-ish (caller supplies
    /// the timestamp so persistence and tests control the clock).
    pub fn new(
        package_id: PackageId,
        status: PackageStatus,
        timestamp: Timestamp,
        actor: ActorRole,
    ) -> Self {
        Self {
            package_id,
            status,
            timestamp,
            actor,
            reason: None,
            location: None,
        }
    }

    /// Attach a reason.
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attach a location.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }
}

/// The most recent entry matching `status`, scanning newest-first.
///
/// History slices are stored oldest-first; re-entered statuses appear more
/// than once and the latest occurrence is the one dwell math cares about.
pub fn latest_entry_for_status<'a>(
    history: &'a [StatusHistoryEntry],
    status: PackageStatus,
) -> Option<&'a StatusHistoryEntry> {
    history.iter().rev().find(|entry| entry.status == status)
}
