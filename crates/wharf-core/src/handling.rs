//! # Special-Handling Tags
//!
//! Free-form handling markers attached to packages at intake. Tags are
//! open-ended strings (intake tooling invents new ones), normalized to
//! lowercase snake form so rule predicates can match reliably. The
//! well-known tags the default rules care about get associated constants.

use serde::{Deserialize, Serialize};

/// A normalized special-handling tag (e.g. `fragile`,
/// `temperature_sensitive`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HandlingTag(String);

impl HandlingTag {
    /// Contents that break under shock.
    pub const FRAGILE: &'static str = "fragile";
    /// Contents that must stay within a temperature band.
    pub const TEMPERATURE_SENSITIVE: &'static str = "temperature_sensitive";

    /// Create a tag, normalizing to trimmed lowercase with underscores.
    pub fn new(raw: &str) -> Self {
        let normalized = raw
            .trim()
            .to_lowercase()
            .replace([' ', '-'], "_");
        Self(normalized)
    }

    /// The normalized tag string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is the `fragile` tag.
    pub fn is_fragile(&self) -> bool {
        self.0 == Self::FRAGILE
    }

    /// Whether this is the `temperature_sensitive` tag.
    pub fn is_temperature_sensitive(&self) -> bool {
        self.0 == Self::TEMPERATURE_SENSITIVE
    }
}

impl std::fmt::Display for HandlingTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for HandlingTag {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}
