use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{EntityKind, OwnedEntity, OwnedPayload, OwnedRow};

/// Owned directly by a tenant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    pub id: Uuid,
    pub name: String,
    pub tenant: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<OwnedRow> for Organization {
    fn from(row: OwnedRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            tenant: row.parent_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrganizationPayload {
    pub name: Option<String>,
    pub tenant: Option<Uuid>,
}

impl OwnedPayload for OrganizationPayload {
    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn parent(&self) -> Option<Uuid> {
        self.tenant
    }
}

impl OwnedEntity for Organization {
    const KIND: EntityKind = EntityKind::Organization;
    type Payload = OrganizationPayload;
}
