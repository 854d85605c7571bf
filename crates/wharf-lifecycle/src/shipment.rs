//! # Shipment Aggregate
//!
//! A shipment is a confirmed group of packages that travels as one unit.
//! Its status must reflect its children's collective state: in particular,
//! a shipment is `Delivered` exactly when every one of its packages is
//! individually delivered, and it never regresses once delivered.
//!
//! The promotion decision (count children, compare, promote) is executed
//! atomically by the store; this module owns the record, the embedded
//! transition log, and the pure promotion helper the stores share.

use serde::{Deserialize, Serialize};

use wharf_core::{PackageId, ShipmentId, Timestamp};

/// The aggregate status of a shipment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShipmentStatus {
    /// Packages are being grouped into the shipment.
    Open,
    /// The grouping has been confirmed for dispatch.
    Confirmed,
    /// The shipment is moving through the carrier network.
    InTransit,
    /// Every package in the shipment has been delivered (terminal).
    Delivered,
}

impl ShipmentStatus {
    /// Whether this status is terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Delivered)
    }

    /// The canonical wire name of this status.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::Confirmed => "CONFIRMED",
            Self::InTransit => "IN_TRANSIT",
            Self::Delivered => "DELIVERED",
        }
    }
}

impl std::fmt::Display for ShipmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Record of a shipment status change, kept in the shipment's embedded log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShipmentTransitionRecord {
    /// Status before the change.
    pub from_status: ShipmentStatus,
    /// Status after the change.
    pub to_status: ShipmentStatus,
    /// When the change occurred.
    pub timestamp: Timestamp,
    /// Why the change occurred (e.g. which reconciliation promoted it).
    pub reason: String,
}

/// A shipment and its package membership.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shipment {
    /// Unique shipment identifier.
    pub id: ShipmentId,
    /// Current aggregate status.
    pub status: ShipmentStatus,
    /// Member packages, in grouping order.
    pub package_ids: Vec<PackageId>,
    /// Denormalized member count, kept equal to `package_ids.len()` so
    /// reconciliation can compare counts without loading members.
    pub package_count: u32,
    /// Audit log of aggregate status changes.
    pub transitions: Vec<ShipmentTransitionRecord>,
    /// When the shipment was created.
    pub created_at: Timestamp,
}

impl Shipment {
    /// Create a new shipment from a grouped set of packages.
    pub fn new(id: ShipmentId, package_ids: Vec<PackageId>, created_at: Timestamp) -> Self {
        let package_count = package_ids.len() as u32;
        Self {
            id,
            status: ShipmentStatus::Open,
            package_ids,
            package_count,
            transitions: Vec::new(),
            created_at,
        }
    }

    /// Whether the shipment has reached its terminal status.
    pub fn is_delivered(&self) -> bool {
        self.status == ShipmentStatus::Delivered
    }

    /// Promote to `Delivered`, appending an audit record.
    ///
    /// Pure record mutation — callers decide *whether* promotion applies
    /// (all packages delivered, not already delivered) and provide the
    /// transactional boundary. Promoting an already-delivered shipment is
    /// a no-op so at-least-once reconciliation stays idempotent.
    pub fn promote_to_delivered(&mut self, timestamp: Timestamp, reason: impl Into<String>) {
        if self.is_delivered() {
            return;
        }
        self.transitions.push(ShipmentTransitionRecord {
            from_status: self.status,
            to_status: ShipmentStatus::Delivered,
            timestamp,
            reason: reason.into(),
        });
        self.status = ShipmentStatus::Delivered;
    }

    /// Record a non-terminal aggregate status change (confirmation,
    /// dispatch). Refuses to regress a delivered shipment.
    pub fn record_status(
        &mut self,
        to: ShipmentStatus,
        timestamp: Timestamp,
        reason: impl Into<String>,
    ) -> bool {
        if self.is_delivered() || to == self.status {
            return false;
        }
        self.transitions.push(ShipmentTransitionRecord {
            from_status: self.status,
            to_status: to,
            timestamp,
            reason: reason.into(),
        });
        self.status = to;
        true
    }
}
