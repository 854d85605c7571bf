//! # Rule Findings
//!
//! What rules produce: a severity, the reporting rule's id, and a message.
//! Errors block a transition; warnings and suggestions never do.

use serde::{Deserialize, Serialize};

/// How strongly a finding bears on the proposed transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Blocks the transition.
    Error,
    /// Surfaced to the operator; the transition proceeds.
    Warning,
    /// Operational advice with no bearing on acceptance.
    Suggestion,
}

/// A single rule finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    /// Identifier of the rule that produced this finding.
    pub rule_id: String,
    /// Severity class.
    pub severity: Severity,
    /// Human-readable description.
    pub message: String,
}

impl Finding {
    /// A blocking error finding.
    pub fn error(rule_id: &str, message: impl Into<String>) -> Self {
        Self {
            rule_id: rule_id.to_string(),
            severity: Severity::Error,
            message: message.into(),
        }
    }

    /// An advisory warning finding.
    pub fn warning(rule_id: &str, message: impl Into<String>) -> Self {
        Self {
            rule_id: rule_id.to_string(),
            severity: Severity::Warning,
            message: message.into(),
        }
    }

    /// An operational suggestion finding.
    pub fn suggestion(rule_id: &str, message: impl Into<String>) -> Self {
        Self {
            rule_id: rule_id.to_string(),
            severity: Severity::Suggestion,
            message: message.into(),
        }
    }
}

/// Accumulated findings across all applicable rules, split by severity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Findings {
    /// Blocking errors.
    pub errors: Vec<Finding>,
    /// Advisory warnings.
    pub warnings: Vec<Finding>,
    /// Operational suggestions.
    pub suggestions: Vec<Finding>,
}

impl Findings {
    /// An empty findings set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a finding to its severity bucket, dropping exact duplicates
    /// (same severity and message) reported by overlapping rules.
    pub fn push(&mut self, finding: Finding) {
        let bucket = match finding.severity {
            Severity::Error => &mut self.errors,
            Severity::Warning => &mut self.warnings,
            Severity::Suggestion => &mut self.suggestions,
        };
        let duplicate = bucket.iter().any(|existing| {
            existing.message == finding.message && existing.severity == finding.severity
        });
        if !duplicate {
            bucket.push(finding);
        }
    }

    /// Absorb every finding from an iterator.
    pub fn extend(&mut self, findings: impl IntoIterator<Item = Finding>) {
        for finding in findings {
            self.push(finding);
        }
    }

    /// Whether any blocking error is present.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Whether no finding of any severity is present.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty() && self.suggestions.is_empty()
    }
}
