//! # Delivery Authorization Service
//!
//! The privileged path for the final hand-off. A 6-digit numeric code is
//! issued once, when a package reaches `Arrived`; redeeming that code is
//! the only way a package becomes `Delivered` through normal operation.
//!
//! ## Redemption Checks
//!
//! Each check independently declines the redemption:
//!
//! 1. the package exists;
//! 2. the code has not already been consumed;
//! 3. the package status is exactly `Arrived`;
//! 4. a redeemable code is issued;
//! 5. the submitted suite matches the owner's (case-insensitive, trimmed);
//! 6. the submitted code matches exactly.
//!
//! The snapshot checks classify the decline for the staff surface; the
//! store's conditional redeem is the authority — it re-verifies status,
//! code state, and code value under the row guard, so two concurrent
//! attempts can never both succeed. On any decline nothing is mutated.

use std::sync::Arc;

use rand::Rng;
use serde::Serialize;
use thiserror::Error;

use wharf_core::{PackageId, StaffId, Timestamp};
use wharf_lifecycle::{DeliveryCodeState, Package, PackageStatus, StatusHistoryEntry};
use wharf_store::{StoreError, WarehouseStore};

use crate::events::{DomainEvent, EventSink};
use crate::reconcile::AggregationReconciler;

/// Why a redemption was declined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeclineReason {
    /// No package with the submitted identifier.
    PackageNotFound,
    /// The package is not in `Arrived`.
    InvalidState,
    /// No redeemable code has been issued.
    CodeNotIssued,
    /// The code was already consumed by an earlier redemption.
    CodeAlreadyUsed,
    /// The submitted suite does not match the package owner's.
    SuiteMismatch,
    /// The submitted code does not match the issued one.
    CodeMismatch,
}

impl DeclineReason {
    /// Staff-facing description of the decline.
    pub fn message(&self) -> &'static str {
        match self {
            Self::PackageNotFound => "package not found",
            Self::InvalidState => "package is not awaiting delivery",
            Self::CodeNotIssued => "no delivery code has been issued for this package",
            Self::CodeAlreadyUsed => "delivery code has already been used",
            Self::SuiteMismatch => "suite number does not match this package",
            Self::CodeMismatch => "delivery code is incorrect",
        }
    }
}

/// Outcome of a redemption attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RedemptionOutcome {
    /// Whether the hand-off was verified and the package delivered.
    pub verified: bool,
    /// The decline reason when not verified.
    pub decline: Option<DeclineReason>,
}

impl RedemptionOutcome {
    /// A non-distinguishing decline message for customer-facing relays,
    /// which must not reveal which check failed.
    pub const GENERIC_DECLINE: &'static str = "delivery could not be verified";

    fn verified() -> Self {
        Self {
            verified: true,
            decline: None,
        }
    }

    fn declined(reason: DeclineReason) -> Self {
        Self {
            verified: false,
            decline: Some(reason),
        }
    }

    /// Staff-facing message for this outcome.
    pub fn message(&self) -> &'static str {
        match self.decline {
            None => "delivery verified",
            Some(reason) => reason.message(),
        }
    }
}

/// Outcome of a code issuance request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueOutcome {
    /// The issued code.
    pub code: String,
    /// Whether this call generated the code (`false`: it already existed).
    pub newly_issued: bool,
}

/// Errors from code issuance.
#[derive(Error, Debug)]
pub enum IssueError {
    /// No package with the given identifier.
    #[error("package not found: {0}")]
    PackageNotFound(PackageId),

    /// The package has not arrived yet (or has already moved on).
    #[error("package is {status}; delivery codes are issued on arrival")]
    NotEligible {
        /// The package's current status.
        status: PackageStatus,
    },

    /// The package's code has already been consumed or invalidated.
    #[error("delivery code has already been consumed or invalidated")]
    CodeConsumed,

    /// The store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Issues and redeems single-use delivery authorization codes.
pub struct DeliveryAuthService {
    store: Arc<dyn WarehouseStore>,
    events: Arc<dyn EventSink>,
    reconciler: Arc<AggregationReconciler>,
}

impl DeliveryAuthService {
    /// Wire the service over a store, event sink, and reconciler.
    pub fn new(
        store: Arc<dyn WarehouseStore>,
        events: Arc<dyn EventSink>,
        reconciler: Arc<AggregationReconciler>,
    ) -> Self {
        Self {
            store,
            events,
            reconciler,
        }
    }

    /// Ensure an arrived package holds a delivery code, issuing one if
    /// needed. Idempotent: re-requesting returns the existing code.
    ///
    /// The code value goes to the notification collaborator through the
    /// event sink; callers relay it out-of-band to the customer.
    pub async fn issue(&self, package_id: PackageId) -> Result<IssueOutcome, IssueError> {
        let package = self
            .store
            .get_package(package_id)
            .await?
            .ok_or(IssueError::PackageNotFound(package_id))?;

        match &package.delivery_code {
            DeliveryCodeState::Issued { code, .. } => {
                return Ok(IssueOutcome {
                    code: code.clone(),
                    newly_issued: false,
                });
            }
            DeliveryCodeState::Redeemed { .. } | DeliveryCodeState::Expired { .. } => {
                return Err(IssueError::CodeConsumed);
            }
            DeliveryCodeState::NoCode => {}
        }

        if package.status != PackageStatus::Arrived {
            return Err(IssueError::NotEligible {
                status: package.status,
            });
        }

        let code = generate_code();
        let stored = self
            .store
            .try_issue_code(package_id, &code, Timestamp::now())
            .await?;

        if stored {
            tracing::info!(%package_id, "delivery code issued");
            self.events.publish(DomainEvent::DeliveryCodeIssued {
                package_id,
                code: code.clone(),
            });
            return Ok(IssueOutcome {
                code,
                newly_issued: true,
            });
        }

        // Lost a race with a concurrent issuer; return whatever won.
        let package = self
            .store
            .get_package(package_id)
            .await?
            .ok_or(IssueError::PackageNotFound(package_id))?;
        match package.delivery_code {
            DeliveryCodeState::Issued { code, .. } => Ok(IssueOutcome {
                code,
                newly_issued: false,
            }),
            _ => Err(IssueError::NotEligible {
                status: package.status,
            }),
        }
    }

    /// Redeem a delivery code, completing the hand-off.
    ///
    /// On success the package is atomically marked `Delivered` with the
    /// performing staff recorded, and the owning shipment (if any) is
    /// reconciled. On decline nothing is mutated.
    pub async fn redeem(
        &self,
        package_id: PackageId,
        submitted_suite: &str,
        submitted_code: &str,
        staff: StaffId,
    ) -> Result<RedemptionOutcome, StoreError> {
        let Some(package) = self.store.get_package(package_id).await? else {
            return Ok(RedemptionOutcome::declined(DeclineReason::PackageNotFound));
        };

        if let Some(reason) = classify_decline(&package, submitted_suite, submitted_code) {
            tracing::info!(%package_id, reason = ?reason, "redemption declined");
            return Ok(RedemptionOutcome::declined(reason));
        }

        let redeemed_at = Timestamp::now();
        let delivered_entry = StatusHistoryEntry::new(
            package_id,
            PackageStatus::Delivered,
            redeemed_at,
            wharf_core::ActorRole::WarehouseStaff,
        )
        .with_reason(format!("delivery code redeemed by {staff}"));

        let won = self
            .store
            .redeem_code(package_id, submitted_code, staff, redeemed_at, delivered_entry)
            .await?;

        if !won {
            // The snapshot passed but the guarded write lost — a
            // concurrent redemption got there first. Re-classify.
            let reason = match self.store.get_package(package_id).await? {
                None => DeclineReason::PackageNotFound,
                Some(package) => classify_decline(&package, submitted_suite, submitted_code)
                    .unwrap_or(DeclineReason::InvalidState),
            };
            tracing::info!(%package_id, reason = ?reason, "redemption lost the race");
            return Ok(RedemptionOutcome::declined(reason));
        }

        tracing::info!(%package_id, %staff, "delivery verified, package DELIVERED");
        let shipment_id = package.shipment_id;
        self.events.publish(DomainEvent::PackageDelivered {
            package_id,
            shipment_id,
            staff: Some(staff),
        });

        if let Some(shipment_id) = shipment_id {
            // At-least-once: the sweep job repairs the aggregate if this
            // call dies between the commit above and here.
            if let Err(e) = self.reconciler.reconcile(shipment_id).await {
                tracing::warn!(%shipment_id, error = %e, "post-delivery reconciliation failed");
            }
        }

        Ok(RedemptionOutcome::verified())
    }

    /// Invalidate an issued code without redeeming it (maintenance use).
    /// Returns whether a code was invalidated.
    pub async fn expire(&self, package_id: PackageId) -> Result<bool, StoreError> {
        let expired = self
            .store
            .expire_code(package_id, Timestamp::now())
            .await?;
        if expired {
            tracing::info!(%package_id, "delivery code expired");
        }
        Ok(expired)
    }
}

/// Classify why this snapshot cannot redeem, if it cannot.
///
/// A consumed code outranks the status check so a repeated redemption of
/// a delivered package reports `CodeAlreadyUsed`, not `InvalidState`.
fn classify_decline(
    package: &Package,
    submitted_suite: &str,
    submitted_code: &str,
) -> Option<DeclineReason> {
    if package.delivery_code.is_redeemed() {
        return Some(DeclineReason::CodeAlreadyUsed);
    }
    if package.status != PackageStatus::Arrived {
        return Some(DeclineReason::InvalidState);
    }
    let DeliveryCodeState::Issued { code, .. } = &package.delivery_code else {
        return Some(DeclineReason::CodeNotIssued);
    };
    if !package.suite.matches_submission(submitted_suite) {
        return Some(DeclineReason::SuiteMismatch);
    }
    if code != submitted_code {
        return Some(DeclineReason::CodeMismatch);
    }
    None
}

/// A 6-digit zero-padded numeric code from OS entropy.
fn generate_code() -> String {
    let n = rand::rngs::OsRng.gen_range(0..1_000_000u32);
    format!("{n:06}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use wharf_core::{ActorRole, CustomerId, CustomerTier, ShipmentId, SuiteNumber};
    use wharf_lifecycle::Shipment;
    use wharf_store::MemoryStore;

    use crate::events::CapturingEventSink;

    fn ts(iso: &str) -> Timestamp {
        Timestamp::parse(iso).unwrap()
    }

    fn make_package(suite: &str) -> Package {
        Package::new_intake(
            PackageId::new(),
            CustomerId::new(),
            SuiteNumber::new(suite).unwrap(),
            CustomerTier::Standard,
            ts("2026-01-15T08:00:00Z"),
        )
    }

    struct Fixture {
        store: Arc<MemoryStore>,
        events: Arc<CapturingEventSink>,
        service: DeliveryAuthService,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let events = Arc::new(CapturingEventSink::new());
        let reconciler = Arc::new(AggregationReconciler::new(
            store.clone(),
            events.clone(),
        ));
        let service = DeliveryAuthService::new(store.clone(), events.clone(), reconciler);
        Fixture {
            store,
            events,
            service,
        }
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

    async fn move_to_arrived(store: &MemoryStore, pkg: &Package) {
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
    }

    /// Seed an arrived package with the fixed code "408603".
    async fn arrived_with_code(fx: &Fixture, suite: &str) -> Package {
        let pkg = make_package(suite);
        seed(&fx.store, &pkg).await;
        move_to_arrived(&fx.store, &pkg).await;
        assert!(fx
            .store
            .try_issue_code(pkg.id, "408603", ts("2026-01-20T09:00:00Z"))
            .await
            .unwrap());
        pkg
    }

    // ── Issuance ─────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_issue_on_arrival_generates_six_digits() {
        let fx = fixture();
        let pkg = make_package("VC-100");
        seed(&fx.store, &pkg).await;
        move_to_arrived(&fx.store, &pkg).await;

        let outcome = fx.service.issue(pkg.id).await.unwrap();
        assert!(outcome.newly_issued);
        assert_eq!(outcome.code.len(), 6);
        assert!(outcome.code.chars().all(|c| c.is_ascii_digit()));
        assert_eq!(fx.events.count_of("delivery_code_issued"), 1);
    }

    #[tokio::test]
    async fn test_issue_is_idempotent() {
        let fx = fixture();
        let pkg = make_package("VC-100");
        seed(&fx.store, &pkg).await;
        move_to_arrived(&fx.store, &pkg).await;

        let first = fx.service.issue(pkg.id).await.unwrap();
        let second = fx.service.issue(pkg.id).await.unwrap();
        assert!(!second.newly_issued);
        assert_eq!(first.code, second.code);
        assert_eq!(fx.events.count_of("delivery_code_issued"), 1);
    }

    #[tokio::test]
    async fn test_issue_before_arrival_is_rejected() {
        let fx = fixture();
        let pkg = make_package("VC-100");
        seed(&fx.store, &pkg).await;
        let result = fx.service.issue(pkg.id).await;
        assert!(matches!(
            result,
            Err(IssueError::NotEligible {
                status: PackageStatus::Pending
            })
        ));
    }

    #[tokio::test]
    async fn test_issue_unknown_package() {
        let fx = fixture();
        let result = fx.service.issue(PackageId::new()).await;
        assert!(matches!(result, Err(IssueError::PackageNotFound(_))));
    }

    // ── Redemption declines ──────────────────────────────────────────

    #[tokio::test]
    async fn test_redeem_unknown_package() {
        let fx = fixture();
        let outcome = fx
            .service
            .redeem(PackageId::new(), "VC-100", "408603", StaffId::new())
            .await
            .unwrap();
        assert!(!outcome.verified);
        assert_eq!(outcome.decline, Some(DeclineReason::PackageNotFound));
    }

    #[tokio::test]
    async fn test_redeem_before_arrival() {
        let fx = fixture();
        let pkg = make_package("VC-100");
        seed(&fx.store, &pkg).await;
        let outcome = fx
            .service
            .redeem(pkg.id, "VC-100", "408603", StaffId::new())
            .await
            .unwrap();
        assert_eq!(outcome.decline, Some(DeclineReason::InvalidState));
    }

    #[tokio::test]
    async fn test_redeem_without_issued_code() {
        let fx = fixture();
        let pkg = make_package("VC-100");
        seed(&fx.store, &pkg).await;
        move_to_arrived(&fx.store, &pkg).await;
        let outcome = fx
            .service
            .redeem(pkg.id, "VC-100", "408603", StaffId::new())
            .await
            .unwrap();
        assert_eq!(outcome.decline, Some(DeclineReason::CodeNotIssued));
    }

    #[tokio::test]
    async fn test_redeem_suite_mismatch() {
        let fx = fixture();
        let pkg = arrived_with_code(&fx, "VC-100").await;
        let outcome = fx
            .service
            .redeem(pkg.id, "VC-200", "408603", StaffId::new())
            .await
            .unwrap();
        assert_eq!(outcome.decline, Some(DeclineReason::SuiteMismatch));
        // Nothing mutated.
        let fetched = fx.store.get_package(pkg.id).await.unwrap().unwrap();
        assert_eq!(fetched.status, PackageStatus::Arrived);
    }

    #[tokio::test]
    async fn test_redeem_code_mismatch() {
        let fx = fixture();
        let pkg = arrived_with_code(&fx, "VC-100").await;
        let outcome = fx
            .service
            .redeem(pkg.id, "VC-100", "408604", StaffId::new())
            .await
            .unwrap();
        assert_eq!(outcome.decline, Some(DeclineReason::CodeMismatch));
    }

    #[tokio::test]
    async fn test_expired_code_cannot_redeem() {
        let fx = fixture();
        let pkg = arrived_with_code(&fx, "VC-100").await;
        assert!(fx.service.expire(pkg.id).await.unwrap());
        let outcome = fx
            .service
            .redeem(pkg.id, "VC-100", "408603", StaffId::new())
            .await
            .unwrap();
        assert_eq!(outcome.decline, Some(DeclineReason::CodeNotIssued));
    }

    // ── Successful redemption ────────────────────────────────────────

    #[tokio::test]
    async fn test_redeem_succeeds_with_case_insensitive_suite() {
        let fx = fixture();
        let pkg = arrived_with_code(&fx, "VC-100").await;
        let staff = StaffId::new();

        let outcome = fx
            .service
            .redeem(pkg.id, "vc-100", "408603", staff)
            .await
            .unwrap();
        assert!(outcome.verified);
        assert_eq!(outcome.message(), "delivery verified");

        let fetched = fx.store.get_package(pkg.id).await.unwrap().unwrap();
        assert_eq!(fetched.status, PackageStatus::Delivered);
        assert!(fetched.delivery_code.is_redeemed());
        assert!(fetched.code_invariants_hold());
        assert_eq!(fx.events.count_of("package_delivered"), 1);
    }

    #[tokio::test]
    async fn test_second_identical_redemption_reports_code_already_used() {
        let fx = fixture();
        let pkg = arrived_with_code(&fx, "VC-100").await;
        let staff = StaffId::new();

        let first = fx
            .service
            .redeem(pkg.id, "vc-100", "408603", staff)
            .await
            .unwrap();
        assert!(first.verified);

        let second = fx
            .service
            .redeem(pkg.id, "vc-100", "408603", staff)
            .await
            .unwrap();
        assert!(!second.verified);
        assert_eq!(second.decline, Some(DeclineReason::CodeAlreadyUsed));
        assert_eq!(fx.events.count_of("package_delivered"), 1);
    }

    #[tokio::test]
    async fn test_redemption_reconciles_owning_shipment() {
        let fx = fixture();
        let pkg = arrived_with_code(&fx, "VC-100").await;
        fx.store
            .create_shipment(Shipment::new(
                ShipmentId::new(),
                vec![pkg.id],
                ts("2026-01-18T09:00:00Z"),
            ))
            .await
            .unwrap();

        let outcome = fx
            .service
            .redeem(pkg.id, "VC-100", "408603", StaffId::new())
            .await
            .unwrap();
        assert!(outcome.verified);
        assert_eq!(fx.events.count_of("shipment_delivered"), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_redemptions_exactly_one_verified() {
        let fx = fixture();
        let pkg = arrived_with_code(&fx, "VC-100").await;
        let service = Arc::new(fx.service);

        let mut tasks = Vec::new();
        for _ in 0..6 {
            let service = service.clone();
            let id = pkg.id;
            tasks.push(tokio::spawn(async move {
                service.redeem(id, "VC-100", "408603", StaffId::new()).await.unwrap()
            }));
        }

        let mut verified = 0;
        for task in tasks {
            let outcome = task.await.unwrap();
            if outcome.verified {
                verified += 1;
            } else {
                assert_eq!(outcome.decline, Some(DeclineReason::CodeAlreadyUsed));
            }
        }
        assert_eq!(verified, 1);
        assert_eq!(fx.events.count_of("package_delivered"), 1);
    }

    // ── Message policy ───────────────────────────────────────────────

    #[test]
    fn test_generic_decline_is_non_distinguishing() {
        // One string for every decline on customer-facing relays.
        assert_eq!(RedemptionOutcome::GENERIC_DECLINE, "delivery could not be verified");
    }
}
