//! # wharf-service — Orchestration Layer
//!
//! Composes the pure lifecycle and rule crates with the store into the
//! operations the outside world calls:
//!
//! - [`TransitionService::propose`] — the general status-change pipeline:
//!   structural validation, business rules, guarded persistence, then
//!   follow-ups (code issuance on arrival, reconciliation on delivery).
//! - [`DeliveryAuthService`] — issues the single-use delivery code when a
//!   package arrives and redeems it exactly once, the privileged path to
//!   `Delivered`.
//! - [`AggregationReconciler`] — keeps a shipment's aggregate status equal
//!   to its packages' collective state; safe to re-run any time.
//!
//! ## Side Effects
//!
//! Mutations publish [`DomainEvent`]s through an [`EventSink`]. Outbound
//! concerns (customer notification, receipt printing) subscribe there;
//! nothing in this crate blocks on them.

pub mod delivery;
pub mod events;
pub mod reconcile;
pub mod transition;

pub use delivery::{
    DeclineReason, DeliveryAuthService, IssueError, IssueOutcome, RedemptionOutcome,
};
pub use events::{CapturingEventSink, DomainEvent, EventSink, NullEventSink, TracingEventSink};
pub use reconcile::{AggregationReconciler, ReconcileError, ReconcileOutcome, SweepSummary};
pub use transition::{TransitionOutcome, TransitionService, TransitionServiceError};

use std::sync::Arc;

use wharf_lifecycle::TransitionValidator;
use wharf_rules::{RuleEngine, RuleSet};
use wharf_store::WarehouseStore;

/// The fully wired service bundle an application surface holds.
#[derive(Clone)]
pub struct Services {
    /// General transition pipeline.
    pub transitions: Arc<TransitionService>,
    /// Delivery-code issuance and redemption.
    pub delivery: Arc<DeliveryAuthService>,
    /// Shipment aggregation reconciler.
    pub reconciler: Arc<AggregationReconciler>,
}

impl Services {
    /// Wire the services over a store, a rule set, and an event sink.
    pub fn new(
        store: Arc<dyn WarehouseStore>,
        rules: RuleSet,
        events: Arc<dyn EventSink>,
    ) -> Self {
        let reconciler = Arc::new(AggregationReconciler::new(store.clone(), events.clone()));
        let delivery = Arc::new(DeliveryAuthService::new(
            store.clone(),
            events.clone(),
            reconciler.clone(),
        ));
        let transitions = Arc::new(TransitionService::new(
            store,
            TransitionValidator::new(),
            RuleEngine::new(rules),
            delivery.clone(),
            reconciler.clone(),
            events,
        ));
        Self {
            transitions,
            delivery,
            reconciler,
        }
    }
}
