//! # Aggregation Reconciler
//!
//! Maintains the aggregation invariant: a shipment is `Delivered` exactly
//! when all of its packages are. The store primitive performs the
//! count-and-promote atomically; this service adds event publication and
//! the maintenance sweep that repairs shipments whose aggregate status
//! drifted (the historical failure this component exists to guard
//! against).
//!
//! Reconciliation only promotes forward and tolerates re-runs, so it is
//! safe under at-least-once invocation from any path: after a redemption,
//! from the maintenance CLI, or both at once.

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use wharf_core::{ShipmentId, Timestamp};
use wharf_store::{StoreError, WarehouseStore};

use crate::events::{DomainEvent, EventSink};

/// Result of one reconciliation pass over a shipment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReconcileOutcome {
    /// Whether this pass promoted the shipment to `Delivered`.
    pub promoted: bool,
}

/// Result of a maintenance sweep over every shipment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SweepSummary {
    /// Shipments inspected.
    pub inspected: usize,
    /// Shipments promoted by this sweep (drift repaired).
    pub promoted: usize,
}

/// Errors from reconciliation.
#[derive(Error, Debug)]
pub enum ReconcileError {
    /// The shipment does not exist.
    #[error("shipment not found: {0}")]
    ShipmentNotFound(ShipmentId),

    /// The store failed.
    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for ReconcileError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::ShipmentNotFound(id) => Self::ShipmentNotFound(id),
            other => Self::Store(other),
        }
    }
}

/// Keeps shipment aggregate status consistent with member packages.
pub struct AggregationReconciler {
    store: Arc<dyn WarehouseStore>,
    events: Arc<dyn EventSink>,
}

impl AggregationReconciler {
    /// Wire a reconciler over a store and event sink.
    pub fn new(store: Arc<dyn WarehouseStore>, events: Arc<dyn EventSink>) -> Self {
        Self { store, events }
    }

    /// Promote the shipment iff every member package is delivered.
    pub async fn reconcile(
        &self,
        shipment_id: ShipmentId,
    ) -> Result<ReconcileOutcome, ReconcileError> {
        let promoted = self
            .store
            .promote_shipment_if_complete(
                shipment_id,
                Timestamp::now(),
                "all member packages delivered",
            )
            .await?;

        if promoted {
            tracing::info!(%shipment_id, "shipment promoted to DELIVERED");
            self.events
                .publish(DomainEvent::ShipmentDelivered { shipment_id });
        }

        Ok(ReconcileOutcome { promoted })
    }

    /// Inspect every non-delivered shipment and promote the complete
    /// ones. The repair job for aggregate-status drift.
    pub async fn sweep(&self) -> Result<SweepSummary, ReconcileError> {
        let mut summary = SweepSummary::default();
        for shipment in self.store.list_shipments().await? {
            if shipment.is_delivered() {
                continue;
            }
            summary.inspected += 1;
            // A shipment deleted mid-sweep is fine to skip.
            match self.reconcile(shipment.id).await {
                Ok(outcome) if outcome.promoted => summary.promoted += 1,
                Ok(_) => {}
                Err(ReconcileError::ShipmentNotFound(_)) => {}
                Err(e) => return Err(e),
            }
        }
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wharf_core::{
        ActorRole, CustomerId, CustomerTier, PackageId, StaffId, SuiteNumber,
    };
    use wharf_lifecycle::{Package, PackageStatus, Shipment, StatusHistoryEntry};
    use wharf_store::MemoryStore;

    use crate::events::CapturingEventSink;

    fn ts(iso: &str) -> Timestamp {
        Timestamp::parse(iso).unwrap()
    }

    fn make_package() -> Package {
        Package::new_intake(
            PackageId::new(),
            CustomerId::new(),
            SuiteNumber::new("VC-100").unwrap(),
            CustomerTier::Standard,
            ts("2026-01-15T08:00:00Z"),
        )
    }

    async fn seed(store: &MemoryStore, pkg: &Package) {
        store
            .insert_package(
                pkg.clone(),
                StatusHistoryEntry::new(pkg.id, pkg.status, pkg.created_at, ActorRole::System),
            )
            .await
            .unwrap();
    }

    async fn deliver(store: &MemoryStore, pkg: &Package) {
        let entry = StatusHistoryEntry::new(
            pkg.id,
            PackageStatus::Arrived,
            ts("2026-01-20T08:00:00Z"),
            ActorRole::WarehouseStaff,
        );
        store
            .apply_transition(pkg.id, PackageStatus::Pending, entry)
            .await
            .unwrap();
        store
            .try_issue_code(pkg.id, "555555", ts("2026-01-20T09:00:00Z"))
            .await
            .unwrap();
        let delivered = StatusHistoryEntry::new(
            pkg.id,
            PackageStatus::Delivered,
            ts("2026-01-21T09:00:00Z"),
            ActorRole::WarehouseStaff,
        );
        assert!(store
            .redeem_code(pkg.id, "555555", StaffId::new(), ts("2026-01-21T09:00:00Z"), delivered)
            .await
            .unwrap());
    }

    async fn fixture() -> (Arc<MemoryStore>, Arc<CapturingEventSink>, AggregationReconciler, Package, Package, ShipmentId)
    {
        let store = Arc::new(MemoryStore::new());
        let events = Arc::new(CapturingEventSink::new());
        let reconciler = AggregationReconciler::new(store.clone(), events.clone());

        let a = make_package();
        let b = make_package();
        seed(&store, &a).await;
        seed(&store, &b).await;
        let shipment_id = ShipmentId::new();
        store
            .create_shipment(Shipment::new(
                shipment_id,
                vec![a.id, b.id],
                ts("2026-01-18T09:00:00Z"),
            ))
            .await
            .unwrap();
        (store, events, reconciler, a, b, shipment_id)
    }

    #[tokio::test]
    async fn test_partial_delivery_does_not_promote() {
        let (store, events, reconciler, a, _b, shipment_id) = fixture().await;
        deliver(&store, &a).await;

        let outcome = reconciler.reconcile(shipment_id).await.unwrap();
        assert!(!outcome.promoted);
        assert_eq!(events.count_of("shipment_delivered"), 0);
    }

    #[tokio::test]
    async fn test_full_delivery_promotes_and_publishes() {
        let (store, events, reconciler, a, b, shipment_id) = fixture().await;
        deliver(&store, &a).await;
        deliver(&store, &b).await;

        let outcome = reconciler.reconcile(shipment_id).await.unwrap();
        assert!(outcome.promoted);
        assert_eq!(events.count_of("shipment_delivered"), 1);

        // Re-running reconciles to a no-op, with no duplicate event.
        let again = reconciler.reconcile(shipment_id).await.unwrap();
        assert!(!again.promoted);
        assert_eq!(events.count_of("shipment_delivered"), 1);
    }

    #[tokio::test]
    async fn test_missing_shipment_is_an_error() {
        let store = Arc::new(MemoryStore::new());
        let reconciler =
            AggregationReconciler::new(store, Arc::new(CapturingEventSink::new()));
        let result = reconciler.reconcile(ShipmentId::new()).await;
        assert!(matches!(result, Err(ReconcileError::ShipmentNotFound(_))));
    }

    #[tokio::test]
    async fn test_sweep_repairs_drifted_shipments() {
        let (store, _events, reconciler, a, b, _shipment_id) = fixture().await;
        deliver(&store, &a).await;
        deliver(&store, &b).await;
        // The shipment sits undelivered even though both packages are
        // delivered — exactly the drift the sweep repairs.
        let summary = reconciler.sweep().await.unwrap();
        assert_eq!(summary.inspected, 1);
        assert_eq!(summary.promoted, 1);

        let second = reconciler.sweep().await.unwrap();
        assert_eq!(second.inspected, 0);
        assert_eq!(second.promoted, 0);
    }
}
