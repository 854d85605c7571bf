//! # Domain Events
//!
//! Decouples status mutations from their outbound side effects. Services
//! publish events after a mutation commits; notification, printing, and
//! other collaborators subscribe through an [`EventSink`] implementation.
//! Publication is fire-and-forget — a slow or failing subscriber can
//! never roll back a committed mutation.

use serde::Serialize;

use wharf_core::{PackageId, ShipmentId, StaffId};

/// An event describing a committed mutation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum DomainEvent {
    /// A delivery authorization code was issued for an arrived package.
    /// The code rides along for the notification collaborator, which
    /// relays it to the customer out-of-band.
    DeliveryCodeIssued {
        /// The arrived package.
        package_id: PackageId,
        /// The issued 6-digit code.
        code: String,
    },
    /// A package reached `Delivered`.
    PackageDelivered {
        /// The delivered package.
        package_id: PackageId,
        /// Its owning shipment, when grouped.
        shipment_id: Option<ShipmentId>,
        /// The staff member who completed the hand-off, when delivery
        /// came through code redemption.
        staff: Option<StaffId>,
    },
    /// Every package in a shipment is delivered and the shipment was
    /// promoted.
    ShipmentDelivered {
        /// The promoted shipment.
        shipment_id: ShipmentId,
    },
}

impl DomainEvent {
    /// Short event name for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::DeliveryCodeIssued { .. } => "delivery_code_issued",
            Self::PackageDelivered { .. } => "package_delivered",
            Self::ShipmentDelivered { .. } => "shipment_delivered",
        }
    }
}

/// Where services publish committed-mutation events.
pub trait EventSink: Send + Sync {
    /// Publish one event. Must not block and must not fail the caller.
    fn publish(&self, event: DomainEvent);
}

/// Discards every event.
#[derive(Debug, Default)]
pub struct NullEventSink;

impl EventSink for NullEventSink {
    fn publish(&self, _event: DomainEvent) {}
}

/// Logs event kinds through `tracing`. Code values are not logged.
#[derive(Debug, Default)]
pub struct TracingEventSink;

impl EventSink for TracingEventSink {
    fn publish(&self, event: DomainEvent) {
        match &event {
            DomainEvent::DeliveryCodeIssued { package_id, .. } => {
                tracing::info!(kind = event.kind(), %package_id, "domain event");
            }
            DomainEvent::PackageDelivered {
                package_id,
                shipment_id,
                ..
            } => {
                tracing::info!(
                    kind = event.kind(),
                    %package_id,
                    shipment_id = ?shipment_id,
                    "domain event"
                );
            }
            DomainEvent::ShipmentDelivered { shipment_id } => {
                tracing::info!(kind = event.kind(), %shipment_id, "domain event");
            }
        }
    }
}

/// Buffers events in memory; the assertion point for tests.
#[derive(Debug, Default)]
pub struct CapturingEventSink {
    events: parking_lot::Mutex<Vec<DomainEvent>>,
}

impl CapturingEventSink {
    /// An empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything published so far.
    pub fn events(&self) -> Vec<DomainEvent> {
        self.events.lock().clone()
    }

    /// Number of published events of a given kind.
    pub fn count_of(&self, kind: &str) -> usize {
        self.events
            .lock()
            .iter()
            .filter(|e| e.kind() == kind)
            .count()
    }
}

impl EventSink for CapturingEventSink {
    fn publish(&self, event: DomainEvent) {
        self.events.lock().push(event);
    }
}
