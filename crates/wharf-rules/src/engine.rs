//! # Rule Engine
//!
//! Runs a rule set against a context: skip rules whose applicability
//! predicate is false, accumulate findings, deduplicate, and return the
//! union. A pure reduction — the engine holds no state beyond the rules
//! it was constructed with.

use crate::context::RuleContext;
use crate::finding::Findings;
use crate::rule::RuleSet;

/// Evaluates business rules against transition contexts.
pub struct RuleEngine {
    rules: RuleSet,
}

impl RuleEngine {
    /// Build an engine over an explicit rule set.
    pub fn new(rules: RuleSet) -> Self {
        Self { rules }
    }

    /// The rule set this engine evaluates.
    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Evaluate every applicable rule and return the merged findings.
    pub fn evaluate(&self, ctx: &RuleContext<'_>) -> Findings {
        let mut findings = Findings::new();
        for rule in self.rules.iter() {
            if !rule.applies(ctx) {
                continue;
            }
            findings.extend(rule.evaluate(ctx));
        }
        findings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finding::{Finding, Severity};
    use crate::rule::Rule;
    use wharf_core::{CustomerId, CustomerTier, PackageId, SuiteNumber, Timestamp};
    use wharf_lifecycle::Package;

    fn package() -> Package {
        Package::new_intake(
            PackageId::new(),
            CustomerId::new(),
            SuiteNumber::new("VC-200").unwrap(),
            CustomerTier::Standard,
            Timestamp::parse("2026-01-15T08:00:00Z").unwrap(),
        )
    }

    struct Always(&'static str, i32, Severity);

    impl Rule for Always {
        fn id(&self) -> &'static str {
            self.0
        }
        fn priority(&self) -> i32 {
            self.1
        }
        fn applies(&self, _ctx: &RuleContext<'_>) -> bool {
            true
        }
        fn evaluate(&self, _ctx: &RuleContext<'_>) -> Vec<Finding> {
            let finding = match self.2 {
                Severity::Error => Finding::error(self.0, format!("{} says no", self.0)),
                Severity::Warning => Finding::warning(self.0, format!("{} is wary", self.0)),
                Severity::Suggestion => {
                    Finding::suggestion(self.0, format!("{} suggests", self.0))
                }
            };
            vec![finding]
        }
    }

    struct Never;

    impl Rule for Never {
        fn id(&self) -> &'static str {
            "never"
        }
        fn priority(&self) -> i32 {
            1000
        }
        fn applies(&self, _ctx: &RuleContext<'_>) -> bool {
            false
        }
        fn evaluate(&self, _ctx: &RuleContext<'_>) -> Vec<Finding> {
            vec![Finding::error("never", "must not appear")]
        }
    }

    #[test]
    fn test_inapplicable_rules_are_skipped() {
        let pkg = package();
        let engine = RuleEngine::new(RuleSet::new(vec![
            Box::new(Never),
            Box::new(Always("w", 10, Severity::Warning)),
        ]));
        let findings = engine.evaluate(&RuleContext::for_review(&pkg, &[]));
        assert!(findings.errors.is_empty());
        assert_eq!(findings.warnings.len(), 1);
    }

    #[test]
    fn test_findings_accumulate_across_rules() {
        let pkg = package();
        let engine = RuleEngine::new(RuleSet::new(vec![
            Box::new(Always("a", 30, Severity::Error)),
            Box::new(Always("b", 20, Severity::Warning)),
            Box::new(Always("c", 10, Severity::Suggestion)),
        ]));
        let findings = engine.evaluate(&RuleContext::for_review(&pkg, &[]));
        assert!(findings.has_errors());
        assert_eq!(findings.warnings.len(), 1);
        assert_eq!(findings.suggestions.len(), 1);
    }

    #[test]
    fn test_empty_rule_set_reports_nothing() {
        let pkg = package();
        let engine = RuleEngine::new(RuleSet::empty());
        let findings = engine.evaluate(&RuleContext::for_review(&pkg, &[]));
        assert!(findings.is_empty());
    }

    #[test]
    fn test_outcome_is_order_independent() {
        let pkg = package();
        let forward = RuleEngine::new(RuleSet::new(vec![
            Box::new(Always("a", 2, Severity::Warning)),
            Box::new(Always("b", 1, Severity::Warning)),
        ]));
        let reversed = RuleEngine::new(RuleSet::new(vec![
            Box::new(Always("b", 2, Severity::Warning)),
            Box::new(Always("a", 1, Severity::Warning)),
        ]));
        let ctx = RuleContext::for_review(&pkg, &[]);
        let f1 = forward.evaluate(&ctx);
        let f2 = reversed.evaluate(&ctx);
        // Same findings either way; only reporting order differs.
        let mut m1: Vec<_> = f1.warnings.iter().map(|f| &f.message).collect();
        let mut m2: Vec<_> = f2.warnings.iter().map(|f| &f.message).collect();
        m1.sort();
        m2.sort();
        assert_eq!(m1, m2);
    }
}
