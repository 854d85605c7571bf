//! # Package Status Catalog
//!
//! The fixed enumeration of package statuses, their catalog order, and the
//! per-status metadata (terminal flag, customer visibility, expected dwell
//! hours) every other layer consults.
//!
//! ## Design
//!
//! Statuses are an enum, not strings — a status outside the catalog cannot
//! exist in the system. String inputs from wire surfaces go through
//! [`PackageStatus::parse`], which is the single place `UnknownStatus` is
//! raised. `describe()` is total over the enum: given a parsed status, the
//! catalog always answers.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A string that does not name any status in the catalog.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown package status: {0:?}")]
pub struct UnknownStatus(pub String);

/// The lifecycle status of a package.
///
/// Variants are listed in catalog order; [`PackageStatus::order_index`]
/// exposes that order for regression checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum PackageStatus {
    /// Announced or just received; not yet processed by intake.
    Pending = 0,
    /// Contents verified, weighed, and photographed by intake.
    Processing = 1,
    /// Processed and waiting to be grouped into a shipment.
    ReadyForGrouping = 2,
    /// Assigned to a shipment that is still being assembled.
    Grouped = 3,
    /// The owning shipment has been confirmed for dispatch.
    GroupConfirmed = 4,
    /// Handed to the carrier.
    Dispatched = 5,
    /// Moving through the carrier network.
    InTransit = 6,
    /// On a vehicle for final delivery.
    OutForDelivery = 7,
    /// At the destination facility, awaiting customer hand-off.
    Arrived = 8,
    /// Handed to the customer (terminal).
    Delivered = 9,
}

/// Catalog metadata for a single status.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatusDescriptor {
    /// No further forward transition is expected from this status.
    pub is_terminal: bool,
    /// Whether customers see this status on self-service surfaces.
    /// Internal grouping stages are hidden.
    pub customer_visible: bool,
    /// How long a package is expected to dwell here before moving on.
    /// `None` for terminal statuses, which have no onward expectation.
    pub expected_dwell_hours: Option<f64>,
}

impl PackageStatus {
    /// Every status, in catalog order.
    pub const ALL: [PackageStatus; 10] = [
        Self::Pending,
        Self::Processing,
        Self::ReadyForGrouping,
        Self::Grouped,
        Self::GroupConfirmed,
        Self::Dispatched,
        Self::InTransit,
        Self::OutForDelivery,
        Self::Arrived,
        Self::Delivered,
    ];

    /// Position of this status in the catalog order.
    pub fn order_index(&self) -> u8 {
        *self as u8
    }

    /// Whether this status is terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Delivered)
    }

    /// Catalog metadata for this status.
    pub fn describe(&self) -> StatusDescriptor {
        let (customer_visible, expected_dwell_hours) = match self {
            Self::Pending => (true, Some(24.0)),
            Self::Processing => (true, Some(48.0)),
            Self::ReadyForGrouping => (false, Some(24.0)),
            Self::Grouped => (false, Some(24.0)),
            Self::GroupConfirmed => (false, Some(12.0)),
            Self::Dispatched => (true, Some(4.0)),
            Self::InTransit => (true, Some(120.0)),
            Self::OutForDelivery => (true, Some(12.0)),
            Self::Arrived => (true, Some(72.0)),
            Self::Delivered => (true, None),
        };
        StatusDescriptor {
            is_terminal: self.is_terminal(),
            customer_visible,
            expected_dwell_hours,
        }
    }

    /// The next status in the catalog sequence, if any.
    pub fn next(&self) -> Option<PackageStatus> {
        let idx = self.order_index() as usize + 1;
        Self::ALL.get(idx).copied()
    }

    /// The canonical wire name of this status (matches the serde form).
    pub fn name(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Processing => "PROCESSING",
            Self::ReadyForGrouping => "READY_FOR_GROUPING",
            Self::Grouped => "GROUPED",
            Self::GroupConfirmed => "GROUP_CONFIRMED",
            Self::Dispatched => "DISPATCHED",
            Self::InTransit => "IN_TRANSIT",
            Self::OutForDelivery => "OUT_FOR_DELIVERY",
            Self::Arrived => "ARRIVED",
            Self::Delivered => "DELIVERED",
        }
    }

    /// Parse a wire name into a catalog status.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownStatus`] for any string outside the catalog.
    pub fn parse(s: &str) -> Result<Self, UnknownStatus> {
        Self::ALL
            .iter()
            .find(|status| status.name() == s)
            .copied()
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

impl std::fmt::Display for PackageStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    // ── Catalog order ────────────────────────────────────────────────

    #[test]
    fn test_order_is_strictly_increasing() {
        for pair in PackageStatus::ALL.windows(2) {
            assert!(pair[0].order_index() < pair[1].order_index());
        }
    }

    #[test]
    fn test_next_walks_the_catalog() {
        assert_eq!(PackageStatus::Pending.next(), Some(PackageStatus::Processing));
        assert_eq!(PackageStatus::Arrived.next(), Some(PackageStatus::Delivered));
        assert_eq!(PackageStatus::Delivered.next(), None);
    }

    // ── Descriptors ──────────────────────────────────────────────────

    #[test]
    fn test_only_delivered_is_terminal() {
        for status in PackageStatus::ALL {
            assert_eq!(status.is_terminal(), status == PackageStatus::Delivered);
        }
    }

    #[test]
    fn test_terminal_has_no_dwell_expectation() {
        assert_eq!(PackageStatus::Delivered.describe().expected_dwell_hours, None);
    }

    #[test]
    fn test_internal_grouping_stages_hidden_from_customers() {
        assert!(!PackageStatus::ReadyForGrouping.describe().customer_visible);
        assert!(!PackageStatus::Grouped.describe().customer_visible);
        assert!(!PackageStatus::GroupConfirmed.describe().customer_visible);
        assert!(PackageStatus::Dispatched.describe().customer_visible);
    }

    #[test]
    fn test_dispatched_dwell_expectation() {
        assert_eq!(
            PackageStatus::Dispatched.describe().expected_dwell_hours,
            Some(4.0)
        );
    }

    // ── Parsing ──────────────────────────────────────────────────────

    #[test]
    fn test_parse_roundtrips_every_name() {
        for status in PackageStatus::ALL {
            assert_eq!(PackageStatus::parse(status.name()), Ok(status));
        }
    }

    #[test]
    fn test_parse_rejects_unknown() {
        let err = PackageStatus::parse("TELEPORTED").unwrap_err();
        assert_eq!(err, UnknownStatus("TELEPORTED".to_string()));
    }

    #[test]
    fn test_parse_is_case_sensitive() {
        assert!(PackageStatus::parse("delivered").is_err());
    }

    #[test]
    fn test_serde_matches_wire_names() {
        let json = serde_json::to_string(&PackageStatus::OutForDelivery).unwrap();
        assert_eq!(json, "\"OUT_FOR_DELIVERY\"");
        let parsed: PackageStatus = serde_json::from_str("\"IN_TRANSIT\"").unwrap();
        assert_eq!(parsed, PackageStatus::InTransit);
    }

    proptest! {
        #[test]
        fn prop_parse_never_panics(s in ".*") {
            let _ = PackageStatus::parse(&s);
        }

        #[test]
        fn prop_describe_is_total(idx in 0usize..10) {
            let status = PackageStatus::ALL[idx];
            let descriptor = status.describe();
            // Non-terminal statuses always carry a dwell expectation.
            prop_assert_eq!(descriptor.expected_dwell_hours.is_none(), descriptor.is_terminal);
        }
    }
}
