//! Shipment reconciliation maintenance.
//!
//! Repairs the historical drift case: a shipment stuck in a pre-delivered
//! status after every one of its packages was individually delivered.

use clap::Args;
use uuid::Uuid;

use wharf_core::ShipmentId;
use wharf_rules::RuleSet;
use wharf_service::Services;

/// Arguments for `wharf reconcile`.
#[derive(Args, Debug)]
pub struct ReconcileArgs {
    /// Shipment to reconcile.
    #[arg(conflicts_with = "all")]
    pub shipment_id: Option<Uuid>,

    /// Sweep every non-delivered shipment.
    #[arg(long)]
    pub all: bool,
}

/// Run the reconciliation command against the Postgres store.
pub async fn run(args: &ReconcileArgs) -> anyhow::Result<()> {
    let store = crate::open_store().await?;
    // Maintenance only exercises the reconciler; no rules are evaluated.
    let services = Services::new(store, RuleSet::empty(), crate::event_sink());

    if args.all {
        let summary = services.reconciler.sweep().await?;
        println!(
            "inspected {} shipment(s), promoted {}",
            summary.inspected, summary.promoted
        );
        return Ok(());
    }

    let Some(id) = args.shipment_id else {
        anyhow::bail!("pass a shipment id or --all");
    };
    let outcome = services.reconciler.reconcile(ShipmentId(id)).await?;
    println!(
        "shipment {id}: {}",
        if outcome.promoted {
            "promoted to DELIVERED"
        } else {
            "no promotion needed"
        }
    );
    Ok(())
}
