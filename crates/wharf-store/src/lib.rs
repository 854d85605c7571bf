//! # wharf-store — Transactional Store Boundary
//!
//! Persistence for packages, shipments, and the append-only status
//! history, behind one trait of conditional atomic primitives.
//!
//! ## Architecture
//!
//! The lifecycle and rule crates are pure; every mutation the system
//! performs funnels through [`WarehouseStore`]. The trait's write methods
//! are *conditional*: each one checks its precondition and mutates in a
//! single atomic step, reporting whether it won. That is what makes
//! double redemption impossible and reconciliation safe to re-run —
//! callers never get to interleave a check with a separate write.
//!
//! ## Implementations
//!
//! - [`MemoryStore`] — a single-lock in-memory store for tests and
//!   development mode.
//! - [`postgres::PostgresStore`] — SQLx over PostgreSQL, row-level
//!   `SELECT … FOR UPDATE` locking inside short transactions. The pool is
//!   optional: without `DATABASE_URL` the stack runs in-memory only.

pub mod error;
pub mod memory;
pub mod postgres;
pub mod store;

pub use error::StoreError;
pub use memory::MemoryStore;
pub use postgres::PostgresStore;
pub use store::WarehouseStore;
