//! # Store Errors
//!
//! Failures crossing the storage boundary. Precondition losses on
//! conditional primitives are *not* errors — those methods return `false`
//! or `None` so callers can classify the outcome; `StoreError` covers
//! missing rows where a row was required, optimistic-concurrency
//! conflicts, and backend failures.

use thiserror::Error;

use wharf_core::{PackageId, ShipmentId};

/// Errors raised by `WarehouseStore` implementations.
#[derive(Error, Debug)]
pub enum StoreError {
    /// A package row that was required does not exist.
    #[error("package not found: {0}")]
    PackageNotFound(PackageId),

    /// A shipment row that was required does not exist.
    #[error("shipment not found: {0}")]
    ShipmentNotFound(ShipmentId),

    /// A row with the same identifier already exists.
    #[error("duplicate row: {0}")]
    Duplicate(String),

    /// A guarded update found the row in a different state than the
    /// caller observed (a concurrent writer got there first).
    #[error("conflict: {0}")]
    Conflict(String),

    /// The storage backend failed.
    #[error("storage backend error: {0}")]
    Backend(#[from] anyhow::Error),
}

impl StoreError {
    /// Wrap a backend error with context.
    pub fn backend(err: impl Into<anyhow::Error>) -> Self {
        Self::Backend(err.into())
    }
}
