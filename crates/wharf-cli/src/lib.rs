//! # wharf-cli — Wharf Ops Stack Command-Line Interface
//!
//! ## Subcommands
//!
//! - `catalog` — print the package status catalog
//! - `reconcile` — repair shipment aggregate-status drift (one shipment
//!   or a full sweep)
//! - `serve` — run the HTTP API server
//!
//! ## Crate Policy
//!
//! - CLI construction (argument parsing) is separated from business logic.
//! - Handler functions delegate to the service crates — no business
//!   logic here.

pub mod catalog;
pub mod reconcile;
pub mod serve;

use std::sync::Arc;

use wharf_service::TracingEventSink;
use wharf_store::{postgres, PostgresStore, WarehouseStore};

/// Open the Postgres-backed store, required by maintenance commands.
pub async fn open_store() -> anyhow::Result<Arc<dyn WarehouseStore>> {
    let pool = postgres::init_pool()
        .await?
        .ok_or_else(|| anyhow::anyhow!("DATABASE_URL must be set for this command"))?;
    Ok(Arc::new(PostgresStore::new(pool)))
}

/// The event sink used by CLI-driven mutations.
pub fn event_sink() -> Arc<TracingEventSink> {
    Arc::new(TracingEventSink)
}
