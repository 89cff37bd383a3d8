use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{EntityKind, OwnedEntity, OwnedPayload, OwnedRow};

/// Owned by an organization; its effective tenant is the organization's.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
    pub id: Uuid,
    pub name: String,
    pub organization: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<OwnedRow> for Department {
    fn from(row: OwnedRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            organization: row.parent_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DepartmentPayload {
    pub name: Option<String>,
    pub organization: Option<Uuid>,
}

impl OwnedPayload for DepartmentPayload {
    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn parent(&self) -> Option<Uuid> {
        self.organization
    }
}

impl OwnedEntity for Department {
    const KIND: EntityKind = EntityKind::Department;
    type Payload = DepartmentPayload;
}
