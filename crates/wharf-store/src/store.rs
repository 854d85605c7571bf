//! # The WarehouseStore Trait
//!
//! The seam between the pure domain and persistence. Reads return
//! snapshots; writes are conditional atomic primitives that check their
//! precondition and mutate in one step.
//!
//! ## Concurrency Contract
//!
//! Implementations must guarantee that each conditional method observes
//! and mutates its rows atomically with respect to every other method on
//! the same store: two concurrent [`redeem_code`] calls for one package
//! must produce exactly one `true`, and [`promote_shipment_if_complete`]
//! must never promote based on a member count it did not verify under the
//! same guard it updates under.
//!
//! [`redeem_code`]: WarehouseStore::redeem_code
//! [`promote_shipment_if_complete`]: WarehouseStore::promote_shipment_if_complete

use async_trait::async_trait;

use wharf_core::{PackageId, ShipmentId, StaffId, Timestamp};
use wharf_lifecycle::{Package, PackageStatus, Shipment, StatusHistoryEntry};

use crate::error::StoreError;

/// Persistent reads and conditional atomic writes over warehouse state.
#[async_trait]
pub trait WarehouseStore: Send + Sync {
    // ── Reads ────────────────────────────────────────────────────────

    /// Fetch a package snapshot.
    async fn get_package(&self, id: PackageId) -> Result<Option<Package>, StoreError>;

    /// Fetch a shipment snapshot.
    async fn get_shipment(&self, id: ShipmentId) -> Result<Option<Shipment>, StoreError>;

    /// All shipments, for maintenance sweeps.
    async fn list_shipments(&self) -> Result<Vec<Shipment>, StoreError>;

    /// The package's status timeline, oldest-first.
    async fn history(&self, id: PackageId) -> Result<Vec<StatusHistoryEntry>, StoreError>;

    // ── Row creation (intake / grouping) ─────────────────────────────

    /// Insert a new package with its initial history entry.
    ///
    /// # Errors
    ///
    /// `Duplicate` if the package id already exists.
    async fn insert_package(
        &self,
        package: Package,
        initial_entry: StatusHistoryEntry,
    ) -> Result<(), StoreError>;

    /// Insert a shipment and stamp `shipment_id` on its member packages.
    ///
    /// # Errors
    ///
    /// `Duplicate` if the shipment id already exists; `PackageNotFound`
    /// if any member id does not.
    async fn create_shipment(&self, shipment: Shipment) -> Result<(), StoreError>;

    // ── Conditional atomic primitives ────────────────────────────────

    /// Move a package to `entry.status` and append `entry` to history,
    /// guarded on the status the caller observed.
    ///
    /// # Errors
    ///
    /// `Conflict` if the current status no longer equals
    /// `expected_current`; `PackageNotFound` if the row vanished.
    async fn apply_transition(
        &self,
        id: PackageId,
        expected_current: PackageStatus,
        entry: StatusHistoryEntry,
    ) -> Result<Package, StoreError>;

    /// Store a freshly issued delivery code, iff the package is `Arrived`
    /// and holds no code. Returns whether this call stored the code.
    async fn try_issue_code(
        &self,
        id: PackageId,
        code: &str,
        issued_at: Timestamp,
    ) -> Result<bool, StoreError>;

    /// Consume a delivery code: iff the package is `Arrived`, a code is
    /// issued, and `submitted_code` matches it exactly, atomically mark
    /// the code redeemed, set the status to `Delivered`, and append
    /// `delivered_entry` to history. Returns whether this call won.
    ///
    /// The suite check happens in the service layer from a snapshot — a
    /// package's suite never changes, so it cannot race.
    async fn redeem_code(
        &self,
        id: PackageId,
        submitted_code: &str,
        staff: StaffId,
        redeemed_at: Timestamp,
        delivered_entry: StatusHistoryEntry,
    ) -> Result<bool, StoreError>;

    /// Invalidate an issued code (`Issued` → `Expired`) without redeeming
    /// it. Returns whether a code was invalidated.
    async fn expire_code(&self, id: PackageId, expired_at: Timestamp)
        -> Result<bool, StoreError>;

    /// Promote the shipment to `Delivered` iff every member package is
    /// individually delivered and the shipment is not already delivered,
    /// appending an audit record. Returns whether promotion happened.
    ///
    /// Safe to re-run at any time (at-least-once); only promotes forward.
    ///
    /// # Errors
    ///
    /// `ShipmentNotFound` if the shipment does not exist.
    async fn promote_shipment_if_complete(
        &self,
        id: ShipmentId,
        at: Timestamp,
        reason: &str,
    ) -> Result<bool, StoreError>;
}
