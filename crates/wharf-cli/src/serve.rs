//! Run the HTTP API server.

use std::sync::Arc;

use clap::Args;

use wharf_api::AppState;
use wharf_store::{postgres, MemoryStore, PostgresStore, WarehouseStore};

/// Arguments for `wharf serve`.
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Listen address.
    #[arg(long, default_value = "0.0.0.0:8080")]
    pub addr: String,
}

/// Start the server. Uses Postgres when `DATABASE_URL` is set, otherwise
/// the in-memory store (development mode).
pub async fn run(args: &ServeArgs) -> anyhow::Result<()> {
    let store: Arc<dyn WarehouseStore> = match postgres::init_pool().await? {
        Some(pool) => Arc::new(PostgresStore::new(pool)),
        None => Arc::new(MemoryStore::new()),
    };
    let state = AppState::new(store, crate::event_sink());

    let listener = tokio::net::TcpListener::bind(&args.addr).await?;
    tracing::info!(addr = %args.addr, "wharf API listening");
    axum::serve(listener, wharf_api::app(state)).await?;
    Ok(())
}
