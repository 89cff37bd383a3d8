pub mod customer;
pub mod department;
pub mod organization;
pub mod tenant;

pub use customer::{Customer, CustomerPayload};
pub use department::{Department, DepartmentPayload};
pub use organization::{Organization, OrganizationPayload};
pub use tenant::{NewTenant, Tenant, TenantChanges, TenantPayload};

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// The four entity types, in ownership order from root to leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Tenant,
    Organization,
    Department,
    Customer,
}

/// Foreign-key hop from a child entity to its owning parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParentLink {
    /// Kind of the owning record.
    pub kind: EntityKind,
    /// Column on the child table holding the parent id.
    pub column: &'static str,
    /// Field name the parent reference is exposed under in payloads.
    pub field: &'static str,
}

impl EntityKind {
    pub const OWNED: [EntityKind; 3] = [
        EntityKind::Organization,
        EntityKind::Department,
        EntityKind::Customer,
    ];

    pub fn table(self) -> &'static str {
        match self {
            EntityKind::Tenant => "tenants",
            EntityKind::Organization => "organizations",
            EntityKind::Department => "departments",
            EntityKind::Customer => "customers",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            EntityKind::Tenant => "Tenant",
            EntityKind::Organization => "Organization",
            EntityKind::Department => "Department",
            EntityKind::Customer => "Customer",
        }
    }

    /// The single ownership hop for this kind. Every tenant-scoping decision
    /// (SQL joins, in-memory traversal, write guards) is derived from this.
    pub fn parent(self) -> Option<ParentLink> {
        match self {
            EntityKind::Tenant => None,
            EntityKind::Organization => Some(ParentLink {
                kind: EntityKind::Tenant,
                column: "tenant_id",
                field: "tenant",
            }),
            EntityKind::Department => Some(ParentLink {
                kind: EntityKind::Organization,
                column: "organization_id",
                field: "organization",
            }),
            EntityKind::Customer => Some(ParentLink {
                kind: EntityKind::Department,
                column: "department_id",
                field: "department",
            }),
        }
    }

    /// The kind directly owned by this one, if any.
    pub fn child(self) -> Option<EntityKind> {
        Self::OWNED
            .into_iter()
            .find(|kind| kind.parent().map(|link| link.kind) == Some(self))
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Storage shape shared by organizations, departments and customers:
/// a name plus one owning parent.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct OwnedRow {
    pub id: Uuid,
    pub name: String,
    pub parent_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert input for an owned record.
#[derive(Debug, Clone)]
pub struct NewOwned {
    pub name: String,
    pub parent_id: Uuid,
}

/// Partial update for an owned record; `None` leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct OwnedChanges {
    pub name: Option<String>,
    pub parent_id: Option<Uuid>,
}

/// Request body accepted by the create/update endpoints of an owned entity.
pub trait OwnedPayload {
    fn name(&self) -> Option<&str>;
    fn parent(&self) -> Option<Uuid>;
}

/// API-facing representation of an owned entity.
pub trait OwnedEntity: From<OwnedRow> + Serialize + Send + 'static {
    const KIND: EntityKind;
    type Payload: OwnedPayload + DeserializeOwned + Send + 'static;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ownership_chain_reaches_tenant() {
        let mut kind = EntityKind::Customer;
        let mut hops = Vec::new();
        while let Some(link) = kind.parent() {
            hops.push(link.column);
            kind = link.kind;
        }
        assert_eq!(kind, EntityKind::Tenant);
        assert_eq!(hops, vec!["department_id", "organization_id", "tenant_id"]);
    }

    #[test]
    fn child_is_inverse_of_parent() {
        assert_eq!(EntityKind::Tenant.child(), Some(EntityKind::Organization));
        assert_eq!(EntityKind::Organization.child(), Some(EntityKind::Department));
        assert_eq!(EntityKind::Department.child(), Some(EntityKind::Customer));
        assert_eq!(EntityKind::Customer.child(), None);
    }
}
