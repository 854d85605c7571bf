//! # Suite Numbers
//!
//! A suite number is the customer-facing mailbox identifier at the
//! warehouse (e.g. `VC-100`). Redemption of a delivery code requires the
//! presenter to state the owning suite; the match is case-insensitive and
//! whitespace-trimmed. `SuiteNumber` normalizes to uppercase at
//! construction so that match is plain equality.

use serde::{Deserialize, Serialize};

use crate::error::WharfError;

/// A normalized (trimmed, uppercased) warehouse suite number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SuiteNumber(String);

impl SuiteNumber {
    /// Create a suite number, trimming whitespace and uppercasing.
    ///
    /// # Errors
    ///
    /// Returns an error when the trimmed input is empty.
    pub fn new(raw: &str) -> Result<Self, WharfError> {
        let normalized = raw.trim().to_uppercase();
        if normalized.is_empty() {
            return Err(WharfError::InvalidSuiteNumber(
                "suite number must be non-empty".to_string(),
            ));
        }
        Ok(Self(normalized))
    }

    /// The normalized suite string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether a raw submission refers to this suite, applying the same
    /// normalization the constructor does.
    pub fn matches_submission(&self, submitted: &str) -> bool {
        submitted.trim().to_uppercase() == self.0
    }
}

impl std::fmt::Display for SuiteNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
