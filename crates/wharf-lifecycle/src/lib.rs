//! # wharf-lifecycle — Package and Shipment Lifecycle
//!
//! Models the forward status sequence every package moves through, the
//! shipments that aggregate packages, and the reasoning layers that sit
//! directly on top of the status catalog.
//!
//! ## Status Sequence
//!
//! ```text
//! Pending ──▶ Processing ──▶ ReadyForGrouping ──▶ Grouped ──▶ GroupConfirmed
//!                                                                  │
//!                                                                  ▼
//!      Delivered ◀── Arrived ◀── OutForDelivery ◀── InTransit ◀── Dispatched
//!      (terminal)
//! ```
//!
//! ## Modules
//!
//! - **status** — the catalog: every status with its order index, terminal
//!   flag, customer-visibility flag, and expected dwell hours.
//! - **history** — the append-only `StatusHistoryEntry` record.
//! - **package** — the `Package` record including its delivery-code state.
//! - **shipment** — the `Shipment` aggregate with its embedded transition log.
//! - **validator** — structural legality of a proposed transition.
//! - **overdue** — dwell-time analysis against the catalog's expectations.
//!
//! ## Design
//!
//! All logic in this crate is pure: no I/O, no clock reads, no storage.
//! The overdue analyzer takes an explicit `as_of` timestamp and the
//! validator takes the history slice it reasons over. Persistence and
//! orchestration live in `wharf-store` and `wharf-service`.

pub mod history;
pub mod overdue;
pub mod package;
pub mod shipment;
pub mod status;
pub mod validator;

// ─── Status re-exports ──────────────────────────────────────────────

pub use status::{PackageStatus, StatusDescriptor, UnknownStatus};

// ─── Record re-exports ──────────────────────────────────────────────

pub use history::StatusHistoryEntry;
pub use package::{DeliveryCodeState, Package};
pub use shipment::{Shipment, ShipmentStatus, ShipmentTransitionRecord};

// ─── Reasoning re-exports ───────────────────────────────────────────

pub use overdue::{OverdueAnalyzer, OverdueReport};
pub use validator::{TransitionCheck, TransitionError, TransitionValidator, TransitionWarning};
