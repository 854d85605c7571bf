//! Print the status catalog.

use clap::Args;

use wharf_lifecycle::PackageStatus;

/// Arguments for `wharf catalog`.
#[derive(Args, Debug)]
pub struct CatalogArgs {
    /// Only show customer-visible statuses.
    #[arg(long)]
    pub customer_visible: bool,
}

/// Print the catalog as an aligned table.
pub fn run(args: &CatalogArgs) {
    println!(
        "{:<4} {:<20} {:<9} {:<17} {:>14}",
        "#", "STATUS", "TERMINAL", "CUSTOMER_VISIBLE", "EXPECTED_HOURS"
    );
    for status in PackageStatus::ALL {
        let descriptor = status.describe();
        if args.customer_visible && !descriptor.customer_visible {
            continue;
        }
        let expected = descriptor
            .expected_dwell_hours
            .map(|h| format!("{h:.0}"))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<4} {:<20} {:<9} {:<17} {:>14}",
            status.order_index(),
            status.name(),
            descriptor.is_terminal,
            descriptor.customer_visible,
            expected
        );
    }
}
