//! # Actor Roles
//!
//! The roles under which status transitions and redemptions are performed.
//! Roles gate nothing by themselves — the transition validator and the
//! rule engine decide what a role may do. Keeping the enum here means every
//! layer matches on the same set of roles.

use serde::{Deserialize, Serialize};

/// The role of the actor proposing an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorRole {
    /// The package's owning customer (self-service surfaces).
    Customer,
    /// Warehouse floor staff.
    WarehouseStaff,
    /// Warehouse administrator.
    WarehouseAdmin,
    /// Automated system actor (intake feeds, maintenance jobs).
    System,
}

impl ActorRole {
    /// The canonical wire name of this role (matches the serde form).
    pub fn name(&self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::WarehouseStaff => "warehouse_staff",
            Self::WarehouseAdmin => "warehouse_admin",
            Self::System => "system",
        }
    }

    /// Whether this role represents warehouse personnel.
    pub fn is_staff(&self) -> bool {
        matches!(self, Self::WarehouseStaff | Self::WarehouseAdmin)
    }
}

impl std::fmt::Display for ActorRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_names() {
        assert_eq!(ActorRole::WarehouseAdmin.name(), "warehouse_admin");
        assert_eq!(ActorRole::Customer.name(), "customer");
    }

    #[test]
    fn test_staff_classification() {
        assert!(ActorRole::WarehouseStaff.is_staff());
        assert!(ActorRole::WarehouseAdmin.is_staff());
        assert!(!ActorRole::Customer.is_staff());
        assert!(!ActorRole::System.is_staff());
    }

    #[test]
    fn test_serde_uses_snake_case() {
        let json = serde_json::to_string(&ActorRole::WarehouseAdmin).unwrap();
        assert_eq!(json, "\"warehouse_admin\"");
        let parsed: ActorRole = serde_json::from_str("\"warehouse_staff\"").unwrap();
        assert_eq!(parsed, ActorRole::WarehouseStaff);
    }
}
