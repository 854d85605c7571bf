//! # Package Record
//!
//! The package aggregate: ownership, current status, shipment membership,
//! handling metadata, and the delivery-authorization-code state machine.
//!
//! ## Delivery Code States
//!
//! ```text
//! NoCode ──issue()──▶ Issued ──redeem()──▶ Redeemed (terminal)
//!                        │
//!                        └──expire()──▶ Expired (terminal)
//! ```
//!
//! Issuance happens exactly once, when the package reaches `Arrived`.
//! Redemption is the only path to `Delivered`. The atomicity of the
//! redeem check-and-mark lives in the store layer; this module defines
//! the states and the package-level invariants they must satisfy.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use wharf_core::{
    CustomerId, CustomerTier, HandlingTag, PackageId, PriorityTier, ShipmentId, StaffId,
    SuiteNumber, Timestamp,
};

use crate::status::PackageStatus;

/// The lifecycle state of a package's delivery authorization code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeliveryCodeState {
    /// No code has been issued yet.
    NoCode,
    /// A code was issued when the package arrived and is awaiting
    /// redemption.
    Issued {
        /// The 6-digit numeric code.
        code: String,
        /// When the code was issued.
        issued_at: Timestamp,
    },
    /// The code was verified and consumed; it can never be used again.
    Redeemed {
        /// The code that was consumed.
        code: String,
        /// When the code was issued.
        issued_at: Timestamp,
        /// When the code was consumed.
        redeemed_at: Timestamp,
        /// The staff member who performed the hand-off.
        staff: StaffId,
    },
    /// The code was invalidated by a maintenance action before redemption.
    Expired {
        /// The invalidated code.
        code: String,
        /// When the code was issued.
        issued_at: Timestamp,
        /// When the code was invalidated.
        expired_at: Timestamp,
    },
}

impl DeliveryCodeState {
    /// Whether a code is currently issued and redeemable.
    pub fn is_issued(&self) -> bool {
        matches!(self, Self::Issued { .. })
    }

    /// Whether the code has been consumed.
    pub fn is_redeemed(&self) -> bool {
        matches!(self, Self::Redeemed { .. })
    }

    /// The code value, in any state that carries one.
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::NoCode => None,
            Self::Issued { code, .. }
            | Self::Redeemed { code, .. }
            | Self::Expired { code, .. } => Some(code),
        }
    }
}

/// A package in the warehouse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Package {
    /// Unique package identifier.
    pub id: PackageId,
    /// The owning customer account.
    pub customer_id: CustomerId,
    /// The owning customer's suite number, checked at redemption.
    pub suite: SuiteNumber,
    /// Current lifecycle status.
    pub status: PackageStatus,
    /// The shipment this package belongs to, once grouped.
    pub shipment_id: Option<ShipmentId>,
    /// Handling urgency.
    pub priority: PriorityTier,
    /// Service level of the owning customer.
    pub customer_tier: CustomerTier,
    /// Special-handling markers from intake.
    pub handling_tags: HashSet<HandlingTag>,
    /// Delivery authorization code state.
    pub delivery_code: DeliveryCodeState,
    /// When the package entered the system.
    pub created_at: Timestamp,
}

impl Package {
    /// Create a new package in `Pending`, as intake does.
    pub fn new_intake(
        id: PackageId,
        customer_id: CustomerId,
        suite: SuiteNumber,
        customer_tier: CustomerTier,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id,
            customer_id,
            suite,
            status: PackageStatus::Pending,
            shipment_id: None,
            priority: PriorityTier::Medium,
            customer_tier,
            handling_tags: HashSet::new(),
            delivery_code: DeliveryCodeState::NoCode,
            created_at,
        }
    }

    /// Set the priority tier.
    pub fn with_priority(mut self, priority: PriorityTier) -> Self {
        self.priority = priority;
        self
    }

    /// Add a handling tag.
    pub fn with_handling_tag(mut self, tag: HandlingTag) -> Self {
        self.handling_tags.insert(tag);
        self
    }

    /// Whether any handling tag satisfies `pred`.
    pub fn has_tag_where(&self, pred: impl Fn(&HandlingTag) -> bool) -> bool {
        self.handling_tags.iter().any(pred)
    }

    /// Whether the package has reached (or passed) `status` in catalog order.
    pub fn has_reached(&self, status: PackageStatus) -> bool {
        self.status.order_index() >= status.order_index()
    }

    /// Check the cross-field invariants between status and code state.
    ///
    /// - A code exists only once the package has reached `Arrived`.
    /// - A redeemed code implies the package is `Delivered`.
    ///
    /// Store implementations uphold these by construction; this check is
    /// the assertion point for tests and repair tooling.
    pub fn code_invariants_hold(&self) -> bool {
        match &self.delivery_code {
            DeliveryCodeState::NoCode => true,
            DeliveryCodeState::Issued { .. } | DeliveryCodeState::Expired { .. } => {
                self.has_reached(PackageStatus::Arrived)
            }
            DeliveryCodeState::Redeemed { .. } => self.status == PackageStatus::Delivered,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_package() -> Package {
        Package::new_intake(
            PackageId::new(),
            CustomerId::new(),
            SuiteNumber::new("VC-100").unwrap(),
            CustomerTier::Standard,
            Timestamp::parse("2026-01-15T08:00:00Z").unwrap(),
        )
    }

    fn issued_code() -> DeliveryCodeState {
        DeliveryCodeState::Issued {
            code: "408603".to_string(),
            issued_at: Timestamp::parse("2026-01-20T08:00:00Z").unwrap(),
        }
    }

    // ── Construction ─────────────────────────────────────────────────

    #[test]
    fn test_intake_starts_pending_without_code() {
        let pkg = base_package();
        assert_eq!(pkg.status, PackageStatus::Pending);
        assert_eq!(pkg.delivery_code, DeliveryCodeState::NoCode);
        assert_eq!(pkg.priority, PriorityTier::Medium);
        assert!(pkg.shipment_id.is_none());
    }

    #[test]
    fn test_builder_tags() {
        let pkg = base_package()
            .with_priority(PriorityTier::High)
            .with_handling_tag(HandlingTag::new("fragile"));
        assert_eq!(pkg.priority, PriorityTier::High);
        assert!(pkg.has_tag_where(HandlingTag::is_fragile));
    }

    // ── Code/status invariants ───────────────────────────────────────

    #[test]
    fn test_no_code_always_consistent() {
        let pkg = base_package();
        assert!(pkg.code_invariants_hold());
    }

    #[test]
    fn test_issued_code_requires_arrived() {
        let mut pkg = base_package();
        pkg.delivery_code = issued_code();
        assert!(!pkg.code_invariants_hold());

        pkg.status = PackageStatus::Arrived;
        assert!(pkg.code_invariants_hold());
    }

    #[test]
    fn test_redeemed_code_requires_delivered() {
        let mut pkg = base_package();
        pkg.status = PackageStatus::Arrived;
        pkg.delivery_code = DeliveryCodeState::Redeemed {
            code: "408603".to_string(),
            issued_at: Timestamp::parse("2026-01-20T08:00:00Z").unwrap(),
            redeemed_at: Timestamp::parse("2026-01-21T09:30:00Z").unwrap(),
            staff: StaffId::new(),
        };
        assert!(!pkg.code_invariants_hold());

        pkg.status = PackageStatus::Delivered;
        assert!(pkg.code_invariants_hold());
    }

    #[test]
    fn test_has_reached_uses_catalog_order() {
        let mut pkg = base_package();
        pkg.status = PackageStatus::InTransit;
        assert!(pkg.has_reached(PackageStatus::Dispatched));
        assert!(pkg.has_reached(PackageStatus::InTransit));
        assert!(!pkg.has_reached(PackageStatus::Arrived));
    }

    #[test]
    fn test_code_state_serde_tagged() {
        let json = serde_json::to_string(&issued_code()).unwrap();
        assert!(json.contains("\"state\":\"ISSUED\""));
        let parsed: DeliveryCodeState = serde_json::from_str(&json).unwrap();
        assert!(parsed.is_issued());
    }
}
