//! # Domain Identity Newtypes
//!
//! Newtype wrappers for all identifiers in the Wharf Ops Stack.
//! These prevent accidental identifier confusion — you cannot pass a
//! `CustomerId` where a `PackageId` is expected, and a redemption request
//! cannot silently swap the staff member for the package.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a package in the warehouse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PackageId(pub Uuid);

/// Unique identifier for a shipment (a confirmed group of packages).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShipmentId(pub Uuid);

/// Unique identifier for a customer account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CustomerId(pub Uuid);

/// Unique identifier for a staff member acting on warehouse state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StaffId(pub Uuid);

macro_rules! impl_uuid_id {
    ($name:ident, $prefix:literal) => {
        impl $name {
            /// Generate a new random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Access the inner UUID.
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }

            /// Parse from a UUID string.
            pub fn parse(s: &str) -> Result<Self, crate::WharfError> {
                Uuid::parse_str(s)
                    .map(Self)
                    .map_err(|e| crate::WharfError::InvalidIdentifier(format!("{s:?}: {e}")))
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, concat!($prefix, ":{}"), self.0)
            }
        }
    };
}

impl_uuid_id!(PackageId, "package");
impl_uuid_id!(ShipmentId, "shipment");
impl_uuid_id!(CustomerId, "customer");
impl_uuid_id!(StaffId, "staff");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_distinct() {
        let a = PackageId::new();
        let b = PackageId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn test_display_carries_namespace() {
        let id = ShipmentId::new();
        assert!(id.to_string().starts_with("shipment:"));
    }

    #[test]
    fn test_parse_roundtrip() {
        let id = PackageId::new();
        let parsed = PackageId::parse(&id.as_uuid().to_string()).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(StaffId::parse("not-a-uuid").is_err());
    }

    #[test]
    fn test_serde_roundtrip() {
        let id = CustomerId::new();
        let json = serde_json::to_string(&id).unwrap();
        let parsed: CustomerId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, parsed);
    }
}
