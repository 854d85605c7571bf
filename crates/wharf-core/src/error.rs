//! # Error Types — Shared Error Hierarchy
//!
//! The top-level error type for foundational concerns. Domain crates define
//! their own focused error enums (`UnknownStatus`, `StoreError`, decline
//! reasons); this type covers the primitives that live in `wharf-core`
//! itself. All errors use `thiserror` for derive-based `Display` and
//! `Error` implementations.

use thiserror::Error;

/// Errors raised by `wharf-core` primitives.
#[derive(Error, Debug)]
pub enum WharfError {
    /// An identifier string could not be parsed.
    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// A timestamp string could not be parsed.
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// A suite number failed validation.
    #[error("invalid suite number: {0}")]
    InvalidSuiteNumber(String),
}
