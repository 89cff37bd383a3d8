use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::database::models::{
    EntityKind, NewOwned, NewTenant, OwnedChanges, OwnedRow, Tenant, TenantChanges,
};
use crate::database::store::{EntityStore, Page, StoreError, StoreResult};
use crate::tenancy::chain::effective_tenant;

/// In-process store backed by `RwLock`ed maps.
///
/// Mirrors the relational behavior of the Postgres schema: unique tenant
/// domains, parent existence on insert/update, and cascading deletes.
/// Selected with `DATABASE_BACKEND=memory` and used by the test suite.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

#[derive(Default)]
struct Tables {
    tenants: HashMap<Uuid, Tenant>,
    owned: HashMap<EntityKind, HashMap<Uuid, OwnedRow>>,
    last_timestamp: Option<DateTime<Utc>>,
}

impl Tables {
    /// Strictly increasing clock so list order matches insert order.
    fn tick(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let next = match self.last_timestamp {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        self.last_timestamp = Some(next);
        next
    }

    fn exists(&self, kind: EntityKind, id: Uuid) -> bool {
        match kind {
            EntityKind::Tenant => self.tenants.contains_key(&id),
            _ => self.owned.get(&kind).is_some_and(|rows| rows.contains_key(&id)),
        }
    }

    fn domain_taken(&self, domain: &str, except: Option<Uuid>) -> bool {
        self.tenants
            .values()
            .any(|tenant| tenant.domain == domain && Some(tenant.id) != except)
    }

    fn require_parent(&self, kind: EntityKind, parent_id: Uuid) -> StoreResult<()> {
        let link = kind.parent().ok_or(StoreError::NotOwned(kind))?;
        if self.exists(link.kind, parent_id) {
            Ok(())
        } else {
            Err(StoreError::MissingParent { kind: link.kind, id: parent_id })
        }
    }

    /// Removes a record and, transitively, everything it owns.
    fn cascade_delete(&mut self, kind: EntityKind, id: Uuid) -> bool {
        let removed = match kind {
            EntityKind::Tenant => self.tenants.remove(&id).is_some(),
            _ => self
                .owned
                .get_mut(&kind)
                .is_some_and(|rows| rows.remove(&id).is_some()),
        };
        if !removed {
            return false;
        }

        if let Some(child) = kind.child() {
            let children: Vec<Uuid> = self
                .owned
                .get(&child)
                .map(|rows| {
                    rows.values()
                        .filter(|row| row.parent_id == id)
                        .map(|row| row.id)
                        .collect()
                })
                .unwrap_or_default();
            for child_id in children {
                self.cascade_delete(child, child_id);
            }
        }
        true
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rows of one kind in list order, copied out so the lock is released
    /// before any ownership traversal.
    async fn snapshot(&self, kind: EntityKind) -> Vec<OwnedRow> {
        let tables = self.tables.read().await;
        let mut rows: Vec<OwnedRow> = tables
            .owned
            .get(&kind)
            .map(|rows| rows.values().cloned().collect())
            .unwrap_or_default();
        rows.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        rows
    }
}

#[async_trait]
impl EntityStore for MemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn tenant_by_domain(&self, domain: &str) -> StoreResult<Option<Tenant>> {
        let tables = self.tables.read().await;
        Ok(tables.tenants.values().find(|t| t.domain == domain).cloned())
    }

    async fn get_tenant(&self, id: Uuid) -> StoreResult<Option<Tenant>> {
        Ok(self.tables.read().await.tenants.get(&id).cloned())
    }

    async fn list_tenants(&self, page: Page) -> StoreResult<Vec<Tenant>> {
        let tables = self.tables.read().await;
        let mut tenants: Vec<Tenant> = tables.tenants.values().cloned().collect();
        tenants.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(page.apply(tenants))
    }

    async fn insert_tenant(&self, input: NewTenant) -> StoreResult<Tenant> {
        let mut tables = self.tables.write().await;
        if tables.domain_taken(&input.domain, None) {
            return Err(StoreError::Duplicate { field: "domain" });
        }
        let now = tables.tick();
        let tenant = Tenant {
            id: Uuid::new_v4(),
            name: input.name,
            domain: input.domain,
            created_at: now,
            updated_at: now,
        };
        tables.tenants.insert(tenant.id, tenant.clone());
        Ok(tenant)
    }

    async fn update_tenant(&self, id: Uuid, changes: TenantChanges) -> StoreResult<Option<Tenant>> {
        let mut tables = self.tables.write().await;
        if !tables.tenants.contains_key(&id) {
            return Ok(None);
        }
        if let Some(domain) = changes.domain.as_deref() {
            if tables.domain_taken(domain, Some(id)) {
                return Err(StoreError::Duplicate { field: "domain" });
            }
        }
        let now = tables.tick();
        let Some(tenant) = tables.tenants.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(name) = changes.name {
            tenant.name = name;
        }
        if let Some(domain) = changes.domain {
            tenant.domain = domain;
        }
        tenant.updated_at = now;
        Ok(Some(tenant.clone()))
    }

    async fn delete_tenant(&self, id: Uuid) -> StoreResult<bool> {
        Ok(self.tables.write().await.cascade_delete(EntityKind::Tenant, id))
    }

    async fn parent_of(&self, kind: EntityKind, id: Uuid) -> StoreResult<Option<Uuid>> {
        let tables = self.tables.read().await;
        Ok(tables
            .owned
            .get(&kind)
            .and_then(|rows| rows.get(&id))
            .map(|row| row.parent_id))
    }

    async fn list_owned(&self, kind: EntityKind, tenant_id: Uuid, page: Page) -> StoreResult<Vec<OwnedRow>> {
        let mut scoped = Vec::new();
        for row in self.snapshot(kind).await {
            if effective_tenant(self, kind, row.id).await? == Some(tenant_id) {
                scoped.push(row);
            }
        }
        Ok(page.apply(scoped))
    }

    async fn get_owned(&self, kind: EntityKind, id: Uuid, tenant_id: Uuid) -> StoreResult<Option<OwnedRow>> {
        let row = {
            let tables = self.tables.read().await;
            tables.owned.get(&kind).and_then(|rows| rows.get(&id)).cloned()
        };
        match row {
            Some(row) if effective_tenant(self, kind, id).await? == Some(tenant_id) => Ok(Some(row)),
            _ => Ok(None),
        }
    }

    async fn insert_owned(&self, kind: EntityKind, input: NewOwned) -> StoreResult<OwnedRow> {
        let mut tables = self.tables.write().await;
        tables.require_parent(kind, input.parent_id)?;
        let now = tables.tick();
        let row = OwnedRow {
            id: Uuid::new_v4(),
            name: input.name,
            parent_id: input.parent_id,
            created_at: now,
            updated_at: now,
        };
        tables.owned.entry(kind).or_default().insert(row.id, row.clone());
        Ok(row)
    }

    async fn update_owned(&self, kind: EntityKind, id: Uuid, changes: OwnedChanges) -> StoreResult<Option<OwnedRow>> {
        let mut tables = self.tables.write().await;
        if !tables.exists(kind, id) {
            return Ok(None);
        }
        if let Some(parent_id) = changes.parent_id {
            tables.require_parent(kind, parent_id)?;
        }
        let now = tables.tick();
        let Some(row) = tables.owned.get_mut(&kind).and_then(|rows| rows.get_mut(&id)) else {
            return Ok(None);
        };
        if let Some(name) = changes.name {
            row.name = name;
        }
        if let Some(parent_id) = changes.parent_id {
            row.parent_id = parent_id;
        }
        row.updated_at = now;
        Ok(Some(row.clone()))
    }

    async fn delete_owned(&self, kind: EntityKind, id: Uuid) -> StoreResult<bool> {
        if kind == EntityKind::Tenant {
            return Err(StoreError::NotOwned(kind));
        }
        Ok(self.tables.write().await.cascade_delete(kind, id))
    }
}
