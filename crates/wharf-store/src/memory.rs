//! # In-Memory Store
//!
//! A single-lock implementation of [`WarehouseStore`] for tests and
//! development mode. Every method takes the one write lock for its whole
//! body, so the conditional primitives are trivially atomic with respect
//! to each other — the same linearization a Postgres row lock provides,
//! without the database.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use wharf_core::{PackageId, ShipmentId, StaffId, Timestamp};
use wharf_lifecycle::{
    DeliveryCodeState, Package, PackageStatus, Shipment, StatusHistoryEntry,
};

use crate::error::StoreError;
use crate::store::WarehouseStore;

#[derive(Default)]
struct Inner {
    packages: HashMap<PackageId, Package>,
    shipments: HashMap<ShipmentId, Shipment>,
    history: HashMap<PackageId, Vec<StatusHistoryEntry>>,
}

/// In-memory [`WarehouseStore`].
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WarehouseStore for MemoryStore {
    async fn get_package(&self, id: PackageId) -> Result<Option<Package>, StoreError> {
        Ok(self.inner.read().packages.get(&id).cloned())
    }

    async fn get_shipment(&self, id: ShipmentId) -> Result<Option<Shipment>, StoreError> {
        Ok(self.inner.read().shipments.get(&id).cloned())
    }

    async fn list_shipments(&self) -> Result<Vec<Shipment>, StoreError> {
        let mut shipments: Vec<Shipment> =
            self.inner.read().shipments.values().cloned().collect();
        shipments.sort_by_key(|s| s.created_at);
        Ok(shipments)
    }

    async fn history(&self, id: PackageId) -> Result<Vec<StatusHistoryEntry>, StoreError> {
        Ok(self
            .inner
            .read()
            .history
            .get(&id)
            .cloned()
            .unwrap_or_default())
    }

    async fn insert_package(
        &self,
        package: Package,
        initial_entry: StatusHistoryEntry,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.write();
        if inner.packages.contains_key(&package.id) {
            return Err(StoreError::Duplicate(package.id.to_string()));
        }
        inner.history.insert(package.id, vec![initial_entry]);
        inner.packages.insert(package.id, package);
        Ok(())
    }

    async fn create_shipment(&self, shipment: Shipment) -> Result<(), StoreError> {
        let mut inner = self.inner.write();
        if inner.shipments.contains_key(&shipment.id) {
            return Err(StoreError::Duplicate(shipment.id.to_string()));
        }
        for package_id in &shipment.package_ids {
            if !inner.packages.contains_key(package_id) {
                return Err(StoreError::PackageNotFound(*package_id));
            }
        }
        for package_id in shipment.package_ids.clone() {
            if let Some(package) = inner.packages.get_mut(&package_id) {
                package.shipment_id = Some(shipment.id);
            }
        }
        inner.shipments.insert(shipment.id, shipment);
        Ok(())
    }

    async fn apply_transition(
        &self,
        id: PackageId,
        expected_current: PackageStatus,
        entry: StatusHistoryEntry,
    ) -> Result<Package, StoreError> {
        let mut inner = self.inner.write();
        let package = inner
            .packages
            .get_mut(&id)
            .ok_or(StoreError::PackageNotFound(id))?;
        if package.status != expected_current {
            return Err(StoreError::Conflict(format!(
                "package {id} is {}, expected {expected_current}",
                package.status
            )));
        }
        package.status = entry.status;
        let snapshot = package.clone();
        inner.history.entry(id).or_default().push(entry);
        Ok(snapshot)
    }

    async fn try_issue_code(
        &self,
        id: PackageId,
        code: &str,
        issued_at: Timestamp,
    ) -> Result<bool, StoreError> {
        let mut inner = self.inner.write();
        let package = inner
            .packages
            .get_mut(&id)
            .ok_or(StoreError::PackageNotFound(id))?;
        let eligible = package.status == PackageStatus::Arrived
            && matches!(package.delivery_code, DeliveryCodeState::NoCode);
        if !eligible {
            return Ok(false);
        }
        package.delivery_code = DeliveryCodeState::Issued {
            code: code.to_string(),
            issued_at,
        };
        Ok(true)
    }

    async fn redeem_code(
        &self,
        id: PackageId,
        submitted_code: &str,
        staff: StaffId,
        redeemed_at: Timestamp,
        delivered_entry: StatusHistoryEntry,
    ) -> Result<bool, StoreError> {
        let mut inner = self.inner.write();
        let package = inner
            .packages
            .get_mut(&id)
            .ok_or(StoreError::PackageNotFound(id))?;
        if package.status != PackageStatus::Arrived {
            return Ok(false);
        }
        let DeliveryCodeState::Issued { code, issued_at } = package.delivery_code.clone()
        else {
            return Ok(false);
        };
        if code != submitted_code {
            return Ok(false);
        }
        package.delivery_code = DeliveryCodeState::Redeemed {
            code,
            issued_at,
            redeemed_at,
            staff,
        };
        package.status = PackageStatus::Delivered;
        inner.history.entry(id).or_default().push(delivered_entry);
        Ok(true)
    }

    async fn expire_code(
        &self,
        id: PackageId,
        expired_at: Timestamp,
    ) -> Result<bool, StoreError> {
        let mut inner = self.inner.write();
        let package = inner
            .packages
            .get_mut(&id)
            .ok_or(StoreError::PackageNotFound(id))?;
        let DeliveryCodeState::Issued { code, issued_at } = package.delivery_code.clone()
        else {
            return Ok(false);
        };
        package.delivery_code = DeliveryCodeState::Expired {
            code,
            issued_at,
            expired_at,
        };
        Ok(true)
    }

    async fn promote_shipment_if_complete(
        &self,
        id: ShipmentId,
        at: Timestamp,
        reason: &str,
    ) -> Result<bool, StoreError> {
        let mut inner = self.inner.write();
        let Inner {
            packages,
            shipments,
            ..
        } = &mut *inner;
        let shipment = shipments
            .get_mut(&id)
            .ok_or(StoreError::ShipmentNotFound(id))?;
        if shipment.is_delivered() {
            return Ok(false);
        }
        let delivered = shipment
            .package_ids
            .iter()
            .filter(|pid| {
                packages
                    .get(pid)
                    .is_some_and(|p| p.status == PackageStatus::Delivered)
            })
            .count() as u32;
        if delivered != shipment.package_count {
            return Ok(false);
        }
        shipment.promote_to_delivered(at, reason);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wharf_core::{ActorRole, CustomerId, CustomerTier, SuiteNumber};

    fn ts(iso: &str) -> Timestamp {
        Timestamp::parse(iso).unwrap()
    }

    fn intake_entry(pkg: &Package) -> StatusHistoryEntry {
        StatusHistoryEntry::new(pkg.id, pkg.status, pkg.created_at, ActorRole::System)
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

    async fn seeded_store(pkg: &Package) -> MemoryStore {
        let store = MemoryStore::new();
        store
            .insert_package(pkg.clone(), intake_entry(pkg))
            .await
            .unwrap();
        store
    }

    async fn advance(store: &MemoryStore, pkg: &Package, statuses: &[PackageStatus]) {
        let mut current = store.get_package(pkg.id).await.unwrap().unwrap().status;
        for (i, status) in statuses.iter().enumerate() {
            let entry = StatusHistoryEntry::new(
                pkg.id,
                *status,
                ts("2026-01-16T00:00:00Z").plus_hours(i as i64),
                ActorRole::WarehouseStaff,
            );
            store.apply_transition(pkg.id, current, entry).await.unwrap();
            current = *status;
        }
    }

    // ── Basic row operations ─────────────────────────────────────────

    #[tokio::test]
    async fn test_insert_and_fetch_package() {
        let pkg = make_package();
        let store = seeded_store(&pkg).await;
        let fetched = store.get_package(pkg.id).await.unwrap().unwrap();
        assert_eq!(fetched, pkg);
        assert_eq!(store.history(pkg.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_package_rejected() {
        let pkg = make_package();
        let store = seeded_store(&pkg).await;
        let result = store.insert_package(pkg.clone(), intake_entry(&pkg)).await;
        assert!(matches!(result, Err(StoreError::Duplicate(_))));
    }

    #[tokio::test]
    async fn test_create_shipment_stamps_members() {
        let a = make_package();
        let b = make_package();
        let store = seeded_store(&a).await;
        store.insert_package(b.clone(), intake_entry(&b)).await.unwrap();

        let shipment = Shipment::new(
            ShipmentId::new(),
            vec![a.id, b.id],
            ts("2026-01-18T09:00:00Z"),
        );
        store.create_shipment(shipment.clone()).await.unwrap();

        let fetched = store.get_package(a.id).await.unwrap().unwrap();
        assert_eq!(fetched.shipment_id, Some(shipment.id));
    }

    #[tokio::test]
    async fn test_create_shipment_requires_members() {
        let store = MemoryStore::new();
        let shipment = Shipment::new(
            ShipmentId::new(),
            vec![PackageId::new()],
            ts("2026-01-18T09:00:00Z"),
        );
        assert!(matches!(
            store.create_shipment(shipment).await,
            Err(StoreError::PackageNotFound(_))
        ));
    }

    // ── Guarded transitions ──────────────────────────────────────────

    #[tokio::test]
    async fn test_apply_transition_appends_history() {
        let pkg = make_package();
        let store = seeded_store(&pkg).await;
        advance(&store, &pkg, &[PackageStatus::Processing]).await;

        let fetched = store.get_package(pkg.id).await.unwrap().unwrap();
        assert_eq!(fetched.status, PackageStatus::Processing);
        assert_eq!(store.history(pkg.id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_apply_transition_conflicts_on_stale_guard() {
        let pkg = make_package();
        let store = seeded_store(&pkg).await;
        advance(&store, &pkg, &[PackageStatus::Processing]).await;

        // Guard still says Pending — someone else already advanced it.
        let entry = StatusHistoryEntry::new(
            pkg.id,
            PackageStatus::ReadyForGrouping,
            ts("2026-01-16T02:00:00Z"),
            ActorRole::WarehouseStaff,
        );
        let result = store
            .apply_transition(pkg.id, PackageStatus::Pending, entry)
            .await;
        assert!(matches!(result, Err(StoreError::Conflict(_))));
    }

    // ── Code issuance and redemption ─────────────────────────────────

    async fn arrived_store_with_code(pkg: &Package, code: &str) -> MemoryStore {
        let store = seeded_store(pkg).await;
        advance(&store, pkg, &[PackageStatus::Arrived]).await;
        assert!(store
            .try_issue_code(pkg.id, code, ts("2026-01-20T08:00:00Z"))
            .await
            .unwrap());
        store
    }

    fn delivered_entry(pkg: &Package) -> StatusHistoryEntry {
        StatusHistoryEntry::new(
            pkg.id,
            PackageStatus::Delivered,
            ts("2026-01-21T09:30:00Z"),
            ActorRole::WarehouseStaff,
        )
    }

    #[tokio::test]
    async fn test_issue_requires_arrived() {
        let pkg = make_package();
        let store = seeded_store(&pkg).await;
        let issued = store
            .try_issue_code(pkg.id, "408603", ts("2026-01-20T08:00:00Z"))
            .await
            .unwrap();
        assert!(!issued);
    }

    #[tokio::test]
    async fn test_issue_is_exactly_once() {
        let pkg = make_package();
        let store = arrived_store_with_code(&pkg, "408603").await;
        let second = store
            .try_issue_code(pkg.id, "999999", ts("2026-01-20T09:00:00Z"))
            .await
            .unwrap();
        assert!(!second);
        let fetched = store.get_package(pkg.id).await.unwrap().unwrap();
        assert_eq!(fetched.delivery_code.code(), Some("408603"));
    }

    #[tokio::test]
    async fn test_redeem_succeeds_once_and_delivers() {
        let pkg = make_package();
        let store = arrived_store_with_code(&pkg, "408603").await;
        let staff = StaffId::new();

        let won = store
            .redeem_code(pkg.id, "408603", staff, ts("2026-01-21T09:30:00Z"), delivered_entry(&pkg))
            .await
            .unwrap();
        assert!(won);

        let fetched = store.get_package(pkg.id).await.unwrap().unwrap();
        assert_eq!(fetched.status, PackageStatus::Delivered);
        assert!(fetched.delivery_code.is_redeemed());
        assert!(fetched.code_invariants_hold());

        // Second attempt with identical inputs loses.
        let again = store
            .redeem_code(pkg.id, "408603", staff, ts("2026-01-21T09:31:00Z"), delivered_entry(&pkg))
            .await
            .unwrap();
        assert!(!again);
    }

    #[tokio::test]
    async fn test_redeem_rejects_wrong_code_without_mutation() {
        let pkg = make_package();
        let store = arrived_store_with_code(&pkg, "408603").await;
        let won = store
            .redeem_code(
                pkg.id,
                "408604",
                StaffId::new(),
                ts("2026-01-21T09:30:00Z"),
                delivered_entry(&pkg),
            )
            .await
            .unwrap();
        assert!(!won);
        let fetched = store.get_package(pkg.id).await.unwrap().unwrap();
        assert_eq!(fetched.status, PackageStatus::Arrived);
        assert!(fetched.delivery_code.is_issued());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_redemptions_single_winner() {
        let pkg = make_package();
        let store =
            std::sync::Arc::new(arrived_store_with_code(&pkg, "408603").await);

        let mut tasks = Vec::new();
        for _ in 0..8 {
            let store = store.clone();
            let entry = delivered_entry(&pkg);
            let id = pkg.id;
            tasks.push(tokio::spawn(async move {
                store
                    .redeem_code(id, "408603", StaffId::new(), ts("2026-01-21T09:30:00Z"), entry)
                    .await
                    .unwrap()
            }));
        }

        let mut wins = 0;
        for task in tasks {
            if task.await.unwrap() {
                wins += 1;
            }
        }
        assert_eq!(wins, 1);
        // Exactly one Delivered history entry was appended.
        let delivered_entries = store
            .history(pkg.id)
            .await
            .unwrap()
            .iter()
            .filter(|e| e.status == PackageStatus::Delivered)
            .count();
        assert_eq!(delivered_entries, 1);
    }

    #[tokio::test]
    async fn test_expire_blocks_redemption() {
        let pkg = make_package();
        let store = arrived_store_with_code(&pkg, "408603").await;
        assert!(store
            .expire_code(pkg.id, ts("2026-01-25T00:00:00Z"))
            .await
            .unwrap());
        let won = store
            .redeem_code(
                pkg.id,
                "408603",
                StaffId::new(),
                ts("2026-01-26T09:30:00Z"),
                delivered_entry(&pkg),
            )
            .await
            .unwrap();
        assert!(!won);
    }

    // ── Shipment promotion ───────────────────────────────────────────

    async fn shipment_fixture() -> (MemoryStore, Package, Package, ShipmentId) {
        let a = make_package();
        let b = make_package();
        let store = seeded_store(&a).await;
        store.insert_package(b.clone(), intake_entry(&b)).await.unwrap();
        let shipment_id = ShipmentId::new();
        store
            .create_shipment(Shipment::new(
                shipment_id,
                vec![a.id, b.id],
                ts("2026-01-18T09:00:00Z"),
            ))
            .await
            .unwrap();
        (store, a, b, shipment_id)
    }

    async fn deliver(store: &MemoryStore, pkg: &Package) {
        advance(store, pkg, &[PackageStatus::Arrived]).await;
        assert!(store
            .try_issue_code(pkg.id, "112233", ts("2026-01-20T08:00:00Z"))
            .await
            .unwrap());
        assert!(store
            .redeem_code(
                pkg.id,
                "112233",
                StaffId::new(),
                ts("2026-01-21T09:30:00Z"),
                delivered_entry(pkg),
            )
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_promotion_waits_for_all_members() {
        let (store, a, _b, shipment_id) = shipment_fixture().await;
        deliver(&store, &a).await;

        let promoted = store
            .promote_shipment_if_complete(shipment_id, ts("2026-01-21T10:00:00Z"), "sweep")
            .await
            .unwrap();
        assert!(!promoted);
    }

    #[tokio::test]
    async fn test_promotion_fires_when_complete_then_noops() {
        let (store, a, b, shipment_id) = shipment_fixture().await;
        deliver(&store, &a).await;
        deliver(&store, &b).await;

        let promoted = store
            .promote_shipment_if_complete(shipment_id, ts("2026-01-21T10:00:00Z"), "sweep")
            .await
            .unwrap();
        assert!(promoted);

        let shipment = store.get_shipment(shipment_id).await.unwrap().unwrap();
        assert!(shipment.is_delivered());
        assert_eq!(shipment.transitions.len(), 1);

        // Re-running is a no-op, not an error.
        let again = store
            .promote_shipment_if_complete(shipment_id, ts("2026-01-21T11:00:00Z"), "sweep")
            .await
            .unwrap();
        assert!(!again);
        let shipment = store.get_shipment(shipment_id).await.unwrap().unwrap();
        assert_eq!(shipment.transitions.len(), 1);
    }

    #[tokio::test]
    async fn test_promotion_missing_shipment_errors() {
        let store = MemoryStore::new();
        let result = store
            .promote_shipment_if_complete(
                ShipmentId::new(),
                ts("2026-01-21T10:00:00Z"),
                "sweep",
            )
            .await;
        assert!(matches!(result, Err(StoreError::ShipmentNotFound(_))));
    }
}
