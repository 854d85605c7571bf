//! # wharf-core — Foundational Types for the Wharf Ops Stack
//!
//! This crate is the bedrock of the Wharf warehouse operations stack. It
//! defines the domain primitives every other crate builds on. Every other
//! crate in the workspace depends on `wharf-core`; it depends on nothing
//! internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for domain primitives.** `PackageId`, `ShipmentId`,
//!    `CustomerId`, `StaffId`, `SuiteNumber` — all newtypes with dedicated
//!    constructors. No bare strings or UUIDs for identifiers.
//!
//! 2. **UTC-only timestamps.** The `Timestamp` type enforces UTC with
//!    seconds precision. Dwell-time arithmetic (how long a package has sat
//!    in a status) flows through it, so there is exactly one clock
//!    convention in the system.
//!
//! 3. **Normalized suite numbers.** Suite comparison during delivery
//!    authorization is case-insensitive and whitespace-trimmed; the
//!    `SuiteNumber` type normalizes at the boundary so the comparison is a
//!    plain equality everywhere else.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `wharf-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - All public types derive `Debug`, `Clone`, and implement
//!   `Serialize`/`Deserialize`.

pub mod actor;
pub mod error;
pub mod handling;
pub mod identity;
pub mod suite;
pub mod temporal;
pub mod tier;

// Re-export primary types for ergonomic imports.
pub use actor::ActorRole;
pub use error::WharfError;
pub use handling::HandlingTag;
pub use identity::{CustomerId, PackageId, ShipmentId, StaffId};
pub use suite::SuiteNumber;
pub use temporal::Timestamp;
pub use tier::{CustomerTier, PriorityTier};
