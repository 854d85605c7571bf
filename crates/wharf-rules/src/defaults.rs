//! # Default Warehouse Rules
//!
//! The rule set a stock deployment runs:
//!
//! - premium/enterprise customers get a priority-processing suggestion
//!   while their package is still `Pending`;
//! - high-priority packages that are overdue and have dwelt more than six
//!   hours surface an expedite warning;
//! - fragile packages warn when entering `InTransit`;
//! - temperature-sensitive packages warn when being `Dispatched`.

use wharf_core::{HandlingTag, PriorityTier};
use wharf_lifecycle::PackageStatus;

use crate::context::RuleContext;
use crate::finding::Finding;
use crate::rule::{Rule, RuleSet};

/// Hours a high-priority package may dwell before an overdue verdict
/// escalates to an expedite warning.
const EXPEDITE_DWELL_THRESHOLD_HOURS: f64 = 6.0;

/// Suggest priority processing for premium/enterprise customers at intake.
pub struct PremiumPriorityProcessing;

impl Rule for PremiumPriorityProcessing {
    fn id(&self) -> &'static str {
        "premium_priority_processing"
    }

    fn priority(&self) -> i32 {
        40
    }

    fn applies(&self, ctx: &RuleContext<'_>) -> bool {
        ctx.package.customer_tier.has_priority_processing()
            && ctx.package.status == PackageStatus::Pending
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Vec<Finding> {
        vec![Finding::suggestion(
            self.id(),
            format!(
                "{} customer: move this package to the front of the processing queue",
                ctx.package.customer_tier
            ),
        )]
    }
}

/// Warn when a high-priority package is overdue after a meaningful dwell.
pub struct HighPriorityExpedite;

impl Rule for HighPriorityExpedite {
    fn id(&self) -> &'static str {
        "high_priority_overdue_expedite"
    }

    fn priority(&self) -> i32 {
        30
    }

    fn applies(&self, ctx: &RuleContext<'_>) -> bool {
        ctx.package.priority == PriorityTier::High
            && ctx.overdue.is_some_and(|report| {
                report.is_overdue && report.elapsed_hours > EXPEDITE_DWELL_THRESHOLD_HOURS
            })
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Vec<Finding> {
        let overdue_by = ctx
            .overdue
            .map(|report| report.overdue_by_hours)
            .unwrap_or(0.0);
        vec![Finding::warning(
            self.id(),
            format!(
                "high-priority package overdue in {} by {overdue_by:.1}h; expedite",
                ctx.package.status
            ),
        )]
    }
}

/// Warn when a fragile package is about to enter the carrier network.
pub struct FragileTransitHandling;

impl Rule for FragileTransitHandling {
    fn id(&self) -> &'static str {
        "fragile_transit_handling"
    }

    fn priority(&self) -> i32 {
        20
    }

    fn applies(&self, ctx: &RuleContext<'_>) -> bool {
        ctx.proposes(PackageStatus::InTransit)
            && ctx.package.has_tag_where(HandlingTag::is_fragile)
    }

    fn evaluate(&self, _ctx: &RuleContext<'_>) -> Vec<Finding> {
        vec![Finding::warning(
            self.id(),
            "fragile package entering transit; verify protective packaging before hand-off",
        )]
    }
}

/// Warn when a temperature-sensitive package is being dispatched.
pub struct TemperatureDispatchHandling;

impl Rule for TemperatureDispatchHandling {
    fn id(&self) -> &'static str {
        "temperature_dispatch_handling"
    }

    fn priority(&self) -> i32 {
        20
    }

    fn applies(&self, ctx: &RuleContext<'_>) -> bool {
        ctx.proposes(PackageStatus::Dispatched)
            && ctx
                .package
                .has_tag_where(HandlingTag::is_temperature_sensitive)
    }

    fn evaluate(&self, _ctx: &RuleContext<'_>) -> Vec<Finding> {
        vec![Finding::warning(
            self.id(),
            "temperature-sensitive package being dispatched; confirm cold-chain placement",
        )]
    }
}

/// The stock rule set.
pub fn default_rule_set() -> RuleSet {
    RuleSet::new(vec![
        Box::new(PremiumPriorityProcessing),
        Box::new(HighPriorityExpedite),
        Box::new(FragileTransitHandling),
        Box::new(TemperatureDispatchHandling),
    ])
}
