//! # Rule Context
//!
//! The bundled facts a rule evaluates against: the package, its timeline,
//! its shipment grouping if any, the acting role, the proposed target
//! status, and the overdue verdict. The context borrows everything — rules
//! never own or mutate state.

use wharf_core::ActorRole;
use wharf_lifecycle::{OverdueReport, Package, PackageStatus, Shipment, StatusHistoryEntry};

/// Everything a business rule may consider for one evaluation.
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    /// The package under evaluation.
    pub package: &'a Package,
    /// The package's status timeline, oldest-first.
    pub history: &'a [StatusHistoryEntry],
    /// The owning shipment, when the package has been grouped.
    pub shipment: Option<&'a Shipment>,
    /// The role proposing the operation.
    pub actor: ActorRole,
    /// The proposed target status, when evaluating a transition. `None`
    /// for standalone package reviews (e.g. an operations sweep).
    pub proposed_status: Option<PackageStatus>,
    /// Dwell-time verdict for the package's current status.
    pub overdue: Option<&'a OverdueReport>,
}

impl<'a> RuleContext<'a> {
    /// A minimal context for a package review with no proposed transition.
    pub fn for_review(
        package: &'a Package,
        history: &'a [StatusHistoryEntry],
    ) -> Self {
        Self {
            package,
            history,
            shipment: None,
            actor: ActorRole::System,
            proposed_status: None,
            overdue: None,
        }
    }

    /// Attach a proposed target status.
    pub fn with_proposed(mut self, status: PackageStatus, actor: ActorRole) -> Self {
        self.proposed_status = Some(status);
        self.actor = actor;
        self
    }

    /// Attach shipment grouping.
    pub fn with_shipment(mut self, shipment: &'a Shipment) -> Self {
        self.shipment = Some(shipment);
        self
    }

    /// Attach an overdue verdict.
    pub fn with_overdue(mut self, report: &'a OverdueReport) -> Self {
        self.overdue = Some(report);
        self
    }

    /// Whether the proposal moves the package into `status`.
    pub fn proposes(&self, status: PackageStatus) -> bool {
        self.proposed_status == Some(status)
    }
}
