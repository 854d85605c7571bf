//! # wharf CLI Entry Point
//!
//! Assembles subcommands and dispatches to handler modules.

use clap::Parser;

/// Wharf Ops Stack CLI — warehouse operations toolchain.
///
/// Inspects the status catalog, repairs shipment aggregate-status drift,
/// and runs the HTTP API server.
#[derive(Parser, Debug)]
#[command(name = "wharf", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Print the package status catalog.
    Catalog(wharf_cli::catalog::CatalogArgs),
    /// Reconcile shipment aggregate status with member packages.
    Reconcile(wharf_cli::reconcile::ReconcileArgs),
    /// Run the HTTP API server.
    Serve(wharf_cli::serve::ServeArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Catalog(args) => {
            wharf_cli::catalog::run(&args);
            Ok(())
        }
        Commands::Reconcile(args) => wharf_cli::reconcile::run(&args).await,
        Commands::Serve(args) => wharf_cli::serve::run(&args).await,
    }
}
