//! # Transition Service
//!
//! The general status-change pipeline:
//!
//! 1. load the package and its timeline;
//! 2. gate structural legality through the [`TransitionValidator`];
//! 3. evaluate business rules over the full context (including the
//!    overdue verdict and shipment grouping);
//! 4. persist through the store's guarded transition;
//! 5. follow up — issue a delivery code on arrival, reconcile the owning
//!    shipment on (override-path) delivery, publish events.
//!
//! Rule errors block before any mutation; warnings and suggestions ride
//! along on an accepted outcome. A terminal no-op (re-confirming
//! `Delivered`) is accepted without touching storage, so replaying it is
//! harmless and writes no duplicate history.

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use wharf_core::{ActorRole, PackageId, Timestamp};
use wharf_lifecycle::{
    OverdueAnalyzer, PackageStatus, StatusHistoryEntry, TransitionCheck, TransitionValidator,
};
use wharf_rules::{Findings, RuleContext, RuleEngine};
use wharf_store::{StoreError, WarehouseStore};

use crate::delivery::DeliveryAuthService;
use crate::events::{DomainEvent, EventSink};
use crate::reconcile::AggregationReconciler;

/// Outcome of a transition proposal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransitionOutcome {
    /// Whether the transition was applied (or accepted as a no-op).
    pub accepted: bool,
    /// The proposal re-confirmed a terminal status; nothing was written.
    pub terminal_noop: bool,
    /// The package's status after the operation, when accepted.
    pub new_status: Option<PackageStatus>,
    /// Structural validation result.
    pub validation: TransitionCheck,
    /// Business-rule findings.
    pub findings: Findings,
    /// Whether a delivery code was issued as a follow-up of this
    /// transition (the code itself travels through the event sink).
    pub code_issued: bool,
}

impl TransitionOutcome {
    fn rejected(validation: TransitionCheck, findings: Findings) -> Self {
        Self {
            accepted: false,
            terminal_noop: false,
            new_status: None,
            validation,
            findings,
            code_issued: false,
        }
    }
}

/// Errors from the transition pipeline.
///
/// Rejections are not errors — they come back as an unaccepted
/// [`TransitionOutcome`]. Errors are missing rows and store failures.
#[derive(Error, Debug)]
pub enum TransitionServiceError {
    /// No package with the given identifier.
    #[error("package not found: {0}")]
    PackageNotFound(PackageId),

    /// The store failed (including guarded-update conflicts).
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Runs the propose-transition pipeline.
pub struct TransitionService {
    store: Arc<dyn WarehouseStore>,
    validator: TransitionValidator,
    engine: RuleEngine,
    analyzer: OverdueAnalyzer,
    delivery: Arc<DeliveryAuthService>,
    reconciler: Arc<AggregationReconciler>,
    events: Arc<dyn EventSink>,
}

impl TransitionService {
    /// Wire the pipeline.
    pub fn new(
        store: Arc<dyn WarehouseStore>,
        validator: TransitionValidator,
        engine: RuleEngine,
        delivery: Arc<DeliveryAuthService>,
        reconciler: Arc<AggregationReconciler>,
        events: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            store,
            validator,
            engine,
            analyzer: OverdueAnalyzer,
            delivery,
            reconciler,
            events,
        }
    }

    /// Propose moving a package to `target`.
    pub async fn propose(
        &self,
        package_id: PackageId,
        target: PackageStatus,
        actor: ActorRole,
        reason: Option<String>,
        location: Option<String>,
    ) -> Result<TransitionOutcome, TransitionServiceError> {
        let package = self
            .store
            .get_package(package_id)
            .await?
            .ok_or(TransitionServiceError::PackageNotFound(package_id))?;
        let history = self.store.history(package_id).await?;

        let validation = self
            .validator
            .validate(package.status, target, actor, &history);

        if !validation.is_accepted() {
            tracing::info!(
                %package_id,
                from = %package.status,
                to = %target,
                "transition rejected by validator"
            );
            return Ok(TransitionOutcome::rejected(validation, Findings::new()));
        }

        if validation.terminal_noop {
            return Ok(TransitionOutcome {
                accepted: true,
                terminal_noop: true,
                new_status: Some(package.status),
                validation,
                findings: Findings::new(),
                code_issued: false,
            });
        }

        let as_of = Timestamp::now();
        let overdue = self.analyzer.analyze(&package, &history, as_of);
        let shipment = match package.shipment_id {
            Some(shipment_id) => self.store.get_shipment(shipment_id).await?,
            None => None,
        };

        let mut ctx = RuleContext::for_review(&package, &history)
            .with_proposed(target, actor)
            .with_overdue(&overdue);
        if let Some(shipment) = shipment.as_ref() {
            ctx = ctx.with_shipment(shipment);
        }
        let findings = self.engine.evaluate(&ctx);

        if findings.has_errors() {
            tracing::info!(
                %package_id,
                to = %target,
                errors = findings.errors.len(),
                "transition blocked by business rules"
            );
            return Ok(TransitionOutcome::rejected(validation, findings));
        }

        let mut entry = StatusHistoryEntry::new(package_id, target, as_of, actor);
        entry.reason = reason;
        entry.location = location;
        let updated = self
            .store
            .apply_transition(package_id, package.status, entry)
            .await?;
        tracing::info!(%package_id, from = %package.status, to = %target, "transition applied");

        let code_issued = self.run_followups(&updated).await;

        Ok(TransitionOutcome {
            accepted: true,
            terminal_noop: false,
            new_status: Some(updated.status),
            validation,
            findings,
            code_issued,
        })
    }

    /// Post-commit follow-ups. Failures here never undo the transition —
    /// each one is recoverable through its own maintenance path (re-issue,
    /// reconciliation sweep).
    async fn run_followups(&self, package: &wharf_lifecycle::Package) -> bool {
        let mut code_issued = false;

        if package.status == PackageStatus::Arrived {
            match self.delivery.issue(package.id).await {
                Ok(outcome) => code_issued = outcome.newly_issued,
                Err(e) => {
                    tracing::warn!(package_id = %package.id, error = %e, "code issuance failed");
                }
            }
        }

        if package.status == PackageStatus::Delivered {
            // Only reachable through an override-role transition; the
            // normal path to DELIVERED is code redemption.
            self.events.publish(DomainEvent::PackageDelivered {
                package_id: package.id,
                shipment_id: package.shipment_id,
                staff: None,
            });
            if let Some(shipment_id) = package.shipment_id {
                if let Err(e) = self.reconciler.reconcile(shipment_id).await {
                    tracing::warn!(%shipment_id, error = %e, "post-delivery reconciliation failed");
                }
            }
        }

        code_issued
    }
}
