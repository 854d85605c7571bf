//! # PostgreSQL Store
//!
//! SQLx implementation of [`WarehouseStore`]. Each conditional primitive
//! runs one short transaction: `SELECT … FOR UPDATE` on the guarded row,
//! the precondition check, then the mutation — so concurrent staff action
//! on the same package or shipment serializes on the row lock exactly as
//! the trait contract requires.
//!
//! The pool is optional. Without `DATABASE_URL` the stack runs on the
//! in-memory store and nothing here is touched.

use anyhow::anyhow;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use async_trait::async_trait;

use wharf_core::{ActorRole, CustomerId, PackageId, ShipmentId, StaffId, SuiteNumber, Timestamp};
use wharf_lifecycle::{
    DeliveryCodeState, Package, PackageStatus, Shipment, ShipmentStatus,
    ShipmentTransitionRecord, StatusHistoryEntry,
};

use crate::error::StoreError;
use crate::store::WarehouseStore;

/// Initialize the connection pool and run migrations.
///
/// Returns `None` if `DATABASE_URL` is not set (in-memory-only mode).
/// Returns `Err` if the URL is set but the connection or migration fails.
pub async fn init_pool() -> Result<Option<PgPool>, sqlx::Error> {
    let url = match std::env::var("DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            tracing::warn!(
                "DATABASE_URL not set — running on the in-memory store. \
                 State will not survive restarts."
            );
            return Ok(None);
        }
    };

    let pool = PgPoolOptions::new()
        .max_connections(20)
        .min_connections(2)
        .acquire_timeout(std::time::Duration::from_secs(5))
        .connect(&url)
        .await?;

    tracing::info!("Connected to PostgreSQL");

    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("Database migrations applied");

    Ok(Some(pool))
}

/// PostgreSQL [`WarehouseStore`].
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Wrap an initialized pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// ─── Row Types ───────────────────────────────────────────────────────

#[derive(sqlx::FromRow)]
struct PackageRow {
    id: Uuid,
    customer_id: Uuid,
    suite: String,
    status: String,
    shipment_id: Option<Uuid>,
    priority: String,
    customer_tier: String,
    handling_tags: serde_json::Value,
    delivery_code: serde_json::Value,
    created_at: DateTime<Utc>,
}

impl PackageRow {
    fn into_package(self) -> Result<Package, StoreError> {
        Ok(Package {
            id: PackageId(self.id),
            customer_id: CustomerId(self.customer_id),
            suite: SuiteNumber::new(&self.suite)
                .map_err(|e| StoreError::Backend(anyhow!("bad suite in row: {e}")))?,
            status: enum_from_name(&self.status)?,
            shipment_id: self.shipment_id.map(ShipmentId),
            priority: enum_from_name(&self.priority)?,
            customer_tier: enum_from_name(&self.customer_tier)?,
            handling_tags: from_json(self.handling_tags)?,
            delivery_code: from_json(self.delivery_code)?,
            created_at: Timestamp::from_utc(self.created_at),
        })
    }
}

#[derive(sqlx::FromRow)]
struct ShipmentRow {
    id: Uuid,
    status: String,
    package_ids: serde_json::Value,
    package_count: i32,
    transition_log: serde_json::Value,
    created_at: DateTime<Utc>,
}

impl ShipmentRow {
    fn into_shipment(self) -> Result<Shipment, StoreError> {
        Ok(Shipment {
            id: ShipmentId(self.id),
            status: enum_from_name(&self.status)?,
            package_ids: from_json(self.package_ids)?,
            package_count: self.package_count as u32,
            transitions: from_json(self.transition_log)?,
            created_at: Timestamp::from_utc(self.created_at),
        })
    }
}

#[derive(sqlx::FromRow)]
struct HistoryRow {
    package_id: Uuid,
    status: String,
    occurred_at: DateTime<Utc>,
    actor: String,
    reason: Option<String>,
    location: Option<String>,
}

impl HistoryRow {
    fn into_entry(self) -> Result<StatusHistoryEntry, StoreError> {
        Ok(StatusHistoryEntry {
            package_id: PackageId(self.package_id),
            status: enum_from_name(&self.status)?,
            timestamp: Timestamp::from_utc(self.occurred_at),
            actor: enum_from_name::<ActorRole>(&self.actor)?,
            reason: self.reason,
            location: self.location,
        })
    }
}

// ─── Serde Helpers ───────────────────────────────────────────────────

/// Serialize a string-shaped enum (status, tier, role) to its wire name.
fn enum_to_name<T: Serialize>(value: &T) -> Result<String, StoreError> {
    match serde_json::to_value(value) {
        Ok(serde_json::Value::String(s)) => Ok(s),
        Ok(other) => Err(StoreError::Backend(anyhow!(
            "expected string-shaped enum, got {other}"
        ))),
        Err(e) => Err(StoreError::Backend(e.into())),
    }
}

/// Parse a wire name back into its enum.
fn enum_from_name<T: DeserializeOwned>(s: &str) -> Result<T, StoreError> {
    serde_json::from_value(serde_json::Value::String(s.to_string()))
        .map_err(|e| StoreError::Backend(anyhow!("bad enum value {s:?} in row: {e}")))
}

fn to_json<T: Serialize>(value: &T) -> Result<serde_json::Value, StoreError> {
    serde_json::to_value(value).map_err(|e| StoreError::Backend(e.into()))
}

fn from_json<T: DeserializeOwned>(value: serde_json::Value) -> Result<T, StoreError> {
    serde_json::from_value(value)
        .map_err(|e| StoreError::Backend(anyhow!("bad JSON document in row: {e}")))
}

fn db_err(e: sqlx::Error) -> StoreError {
    StoreError::Backend(e.into())
}

/// PostgreSQL unique-violation code.
const UNIQUE_VIOLATION: &str = "23505";

fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.code().as_deref() == Some(UNIQUE_VIOLATION))
}

// ─── Query Helpers ───────────────────────────────────────────────────

/// Lock and fetch a package row inside a transaction.
async fn lock_package(
    txn: &mut Transaction<'_, Postgres>,
    id: PackageId,
) -> Result<Option<Package>, StoreError> {
    let row = sqlx::query_as::<_, PackageRow>(
        "SELECT id, customer_id, suite, status, shipment_id, priority, customer_tier,
                handling_tags, delivery_code, created_at
         FROM packages WHERE id = $1 FOR UPDATE",
    )
    .bind(id.0)
    .fetch_optional(&mut **txn)
    .await
    .map_err(db_err)?;
    row.map(PackageRow::into_package).transpose()
}

async fn insert_history(
    txn: &mut Transaction<'_, Postgres>,
    entry: &StatusHistoryEntry,
) -> Result<(), StoreError> {
    sqlx::query(
        "INSERT INTO status_history (package_id, status, occurred_at, actor, reason, location)
         VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(entry.package_id.0)
    .bind(entry.status.name())
    .bind(entry.timestamp.as_datetime())
    .bind(enum_to_name(&entry.actor)?)
    .bind(&entry.reason)
    .bind(&entry.location)
    .execute(&mut **txn)
    .await
    .map_err(db_err)?;
    Ok(())
}

async fn update_package_code(
    txn: &mut Transaction<'_, Postgres>,
    id: PackageId,
    status: PackageStatus,
    code: &DeliveryCodeState,
) -> Result<(), StoreError> {
    sqlx::query("UPDATE packages SET status = $1, delivery_code = $2 WHERE id = $3")
        .bind(status.name())
        .bind(to_json(code)?)
        .bind(id.0)
        .execute(&mut **txn)
        .await
        .map_err(db_err)?;
    Ok(())
}

// ─── Trait Implementation ────────────────────────────────────────────

#[async_trait]
impl WarehouseStore for PostgresStore {
    async fn get_package(&self, id: PackageId) -> Result<Option<Package>, StoreError> {
        let row = sqlx::query_as::<_, PackageRow>(
            "SELECT id, customer_id, suite, status, shipment_id, priority, customer_tier,
                    handling_tags, delivery_code, created_at
             FROM packages WHERE id = $1",
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;
        row.map(PackageRow::into_package).transpose()
    }

    async fn get_shipment(&self, id: ShipmentId) -> Result<Option<Shipment>, StoreError> {
        let row = sqlx::query_as::<_, ShipmentRow>(
            "SELECT id, status, package_ids, package_count, transition_log, created_at
             FROM shipments WHERE id = $1",
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;
        row.map(ShipmentRow::into_shipment).transpose()
    }

    async fn list_shipments(&self) -> Result<Vec<Shipment>, StoreError> {
        let rows = sqlx::query_as::<_, ShipmentRow>(
            "SELECT id, status, package_ids, package_count, transition_log, created_at
             FROM shipments ORDER BY created_at",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        rows.into_iter().map(ShipmentRow::into_shipment).collect()
    }

    async fn history(&self, id: PackageId) -> Result<Vec<StatusHistoryEntry>, StoreError> {
        let rows = sqlx::query_as::<_, HistoryRow>(
            "SELECT package_id, status, occurred_at, actor, reason, location
             FROM status_history WHERE package_id = $1 ORDER BY seq",
        )
        .bind(id.0)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        rows.into_iter().map(HistoryRow::into_entry).collect()
    }

    async fn insert_package(
        &self,
        package: Package,
        initial_entry: StatusHistoryEntry,
    ) -> Result<(), StoreError> {
        let mut txn = self.pool.begin().await.map_err(db_err)?;

        let result = sqlx::query(
            "INSERT INTO packages (id, customer_id, suite, status, shipment_id, priority,
                                   customer_tier, handling_tags, delivery_code, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(package.id.0)
        .bind(package.customer_id.0)
        .bind(package.suite.as_str())
        .bind(package.status.name())
        .bind(package.shipment_id.map(|s| s.0))
        .bind(enum_to_name(&package.priority)?)
        .bind(enum_to_name(&package.customer_tier)?)
        .bind(to_json(&package.handling_tags)?)
        .bind(to_json(&package.delivery_code)?)
        .bind(package.created_at.as_datetime())
        .execute(&mut *txn)
        .await;

        if let Err(e) = result {
            if is_unique_violation(&e) {
                return Err(StoreError::Duplicate(package.id.to_string()));
            }
            return Err(db_err(e));
        }

        insert_history(&mut txn, &initial_entry).await?;
        txn.commit().await.map_err(db_err)
    }

    async fn create_shipment(&self, shipment: Shipment) -> Result<(), StoreError> {
        let mut txn = self.pool.begin().await.map_err(db_err)?;

        let result = sqlx::query(
            "INSERT INTO shipments (id, status, package_ids, package_count, transition_log,
                                    created_at)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(shipment.id.0)
        .bind(shipment.status.name())
        .bind(to_json(&shipment.package_ids)?)
        .bind(shipment.package_count as i32)
        .bind(to_json(&shipment.transitions)?)
        .bind(shipment.created_at.as_datetime())
        .execute(&mut *txn)
        .await;

        if let Err(e) = result {
            if is_unique_violation(&e) {
                return Err(StoreError::Duplicate(shipment.id.to_string()));
            }
            return Err(db_err(e));
        }

        let member_ids: Vec<Uuid> = shipment.package_ids.iter().map(|p| p.0).collect();
        let stamped = sqlx::query("UPDATE packages SET shipment_id = $1 WHERE id = ANY($2)")
            .bind(shipment.id.0)
            .bind(&member_ids)
            .execute(&mut *txn)
            .await
            .map_err(db_err)?;

        if stamped.rows_affected() != member_ids.len() as u64 {
            // At least one member id has no package row; abort the grouping.
            let missing = PackageId(member_ids[0]);
            return Err(StoreError::PackageNotFound(missing));
        }

        txn.commit().await.map_err(db_err)
    }

    async fn apply_transition(
        &self,
        id: PackageId,
        expected_current: PackageStatus,
        entry: StatusHistoryEntry,
    ) -> Result<Package, StoreError> {
        let mut txn = self.pool.begin().await.map_err(db_err)?;

        let mut package = lock_package(&mut txn, id)
            .await?
            .ok_or(StoreError::PackageNotFound(id))?;
        if package.status != expected_current {
            return Err(StoreError::Conflict(format!(
                "package {id} is {}, expected {expected_current}",
                package.status
            )));
        }

        sqlx::query("UPDATE packages SET status = $1 WHERE id = $2")
            .bind(entry.status.name())
            .bind(id.0)
            .execute(&mut *txn)
            .await
            .map_err(db_err)?;
        insert_history(&mut txn, &entry).await?;
        txn.commit().await.map_err(db_err)?;

        package.status = entry.status;
        Ok(package)
    }

    async fn try_issue_code(
        &self,
        id: PackageId,
        code: &str,
        issued_at: Timestamp,
    ) -> Result<bool, StoreError> {
        let mut txn = self.pool.begin().await.map_err(db_err)?;

        let package = lock_package(&mut txn, id)
            .await?
            .ok_or(StoreError::PackageNotFound(id))?;
        let eligible = package.status == PackageStatus::Arrived
            && matches!(package.delivery_code, DeliveryCodeState::NoCode);
        if !eligible {
            return Ok(false);
        }

        let issued = DeliveryCodeState::Issued {
            code: code.to_string(),
            issued_at,
        };
        update_package_code(&mut txn, id, package.status, &issued).await?;
        txn.commit().await.map_err(db_err)?;
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
        let mut txn = self.pool.begin().await.map_err(db_err)?;

        let package = lock_package(&mut txn, id)
            .await?
            .ok_or(StoreError::PackageNotFound(id))?;
        if package.status != PackageStatus::Arrived {
            return Ok(false);
        }
        let DeliveryCodeState::Issued { code, issued_at } = package.delivery_code else {
            return Ok(false);
        };
        if code != submitted_code {
            return Ok(false);
        }

        let redeemed = DeliveryCodeState::Redeemed {
            code,
            issued_at,
            redeemed_at,
            staff,
        };
        update_package_code(&mut txn, id, PackageStatus::Delivered, &redeemed).await?;
        insert_history(&mut txn, &delivered_entry).await?;
        txn.commit().await.map_err(db_err)?;
        Ok(true)
    }

    async fn expire_code(
        &self,
        id: PackageId,
        expired_at: Timestamp,
    ) -> Result<bool, StoreError> {
        let mut txn = self.pool.begin().await.map_err(db_err)?;

        let package = lock_package(&mut txn, id)
            .await?
            .ok_or(StoreError::PackageNotFound(id))?;
        let DeliveryCodeState::Issued { code, issued_at } = package.delivery_code else {
            return Ok(false);
        };

        let expired = DeliveryCodeState::Expired {
            code,
            issued_at,
            expired_at,
        };
        update_package_code(&mut txn, id, package.status, &expired).await?;
        txn.commit().await.map_err(db_err)?;
        Ok(true)
    }

    async fn promote_shipment_if_complete(
        &self,
        id: ShipmentId,
        at: Timestamp,
        reason: &str,
    ) -> Result<bool, StoreError> {
        let mut txn = self.pool.begin().await.map_err(db_err)?;

        let row = sqlx::query_as::<_, ShipmentRow>(
            "SELECT id, status, package_ids, package_count, transition_log, created_at
             FROM shipments WHERE id = $1 FOR UPDATE",
        )
        .bind(id.0)
        .fetch_optional(&mut *txn)
        .await
        .map_err(db_err)?;
        let mut shipment = row
            .map(ShipmentRow::into_shipment)
            .transpose()?
            .ok_or(StoreError::ShipmentNotFound(id))?;

        if shipment.is_delivered() {
            return Ok(false);
        }

        let delivered: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM packages WHERE shipment_id = $1 AND status = $2",
        )
        .bind(id.0)
        .bind(PackageStatus::Delivered.name())
        .fetch_one(&mut *txn)
        .await
        .map_err(db_err)?;

        if delivered as u32 != shipment.package_count {
            return Ok(false);
        }

        shipment.promote_to_delivered(at, reason);
        sqlx::query("UPDATE shipments SET status = $1, transition_log = $2 WHERE id = $3")
            .bind(ShipmentStatus::Delivered.name())
            .bind(to_json(&shipment.transitions)?)
            .bind(id.0)
            .execute(&mut *txn)
            .await
            .map_err(db_err)?;
        txn.commit().await.map_err(db_err)?;
        Ok(true)
    }
}
