use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{EntityKind, OwnedEntity, OwnedPayload, OwnedRow};

/// Leaf of the hierarchy, owned by a department.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: Uuid,
    pub name: String,
    pub department: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<OwnedRow> for Customer {
    fn from(row: OwnedRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            department: row.parent_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CustomerPayload {
    pub name: Option<String>,
    pub department: Option<Uuid>,
}

impl OwnedPayload for CustomerPayload {
    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn parent(&self) -> Option<Uuid> {
        self.department
    }
}

impl OwnedEntity for Customer {
    const KIND: EntityKind = EntityKind::Customer;
    type Payload = CustomerPayload;
}
