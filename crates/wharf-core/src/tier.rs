//! # Priority and Customer Tiers
//!
//! Two independent orderings: how urgently a package should move through
//! the warehouse, and what service level its owning customer has bought.
//! Business rules combine both (a premium customer's low-priority package
//! is not the same as a standard customer's high-priority one).

use serde::{Deserialize, Serialize};

/// Handling urgency of a single package.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriorityTier {
    /// No urgency beyond normal flow.
    Low,
    /// Default tier for new intake.
    Medium,
    /// Expedite where possible; overdue high-priority packages surface
    /// warnings in the rule engine.
    High,
}

/// Service level of the owning customer account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CustomerTier {
    /// Base service level.
    Standard,
    /// Paid tier with processing-priority suggestions.
    Premium,
    /// Contract accounts with negotiated SLAs.
    Enterprise,
}

impl CustomerTier {
    /// Whether this tier is entitled to priority-processing treatment.
    pub fn has_priority_processing(&self) -> bool {
        matches!(self, Self::Premium | Self::Enterprise)
    }
}

impl std::fmt::Display for PriorityTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        };
        f.write_str(s)
    }
}

impl std::fmt::Display for CustomerTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Standard => "standard",
            Self::Premium => "premium",
            Self::Enterprise => "enterprise",
        };
        f.write_str(s)
    }
}
