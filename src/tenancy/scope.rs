use uuid::Uuid;

use super::context::RequestContext;
use crate::config::TenantAccess;
use crate::database::models::{EntityKind, OwnedRow, Tenant};
use crate::database::{EntityStore, Page, StoreResult};

/// Rows of `kind` owned by the context tenant. Unresolved contexts see nothing
/// and never reach the store.
pub async fn list_owned(
    store: &dyn EntityStore,
    ctx: &RequestContext,
    kind: EntityKind,
    page: Page,
) -> StoreResult<Vec<OwnedRow>> {
    match ctx.tenant_id() {
        Some(tenant_id) => store.list_owned(kind, tenant_id, page).await,
        None => Ok(Vec::new()),
    }
}

/// A single row of `kind`, or `None` when it is missing or owned by a
/// different tenant. The two cases are deliberately indistinguishable.
pub async fn find_owned(
    store: &dyn EntityStore,
    ctx: &RequestContext,
    kind: EntityKind,
    id: Uuid,
) -> StoreResult<Option<OwnedRow>> {
    match ctx.tenant_id() {
        Some(tenant_id) => store.get_owned(kind, id, tenant_id).await,
        None => Ok(None),
    }
}

pub async fn list_tenants(
    store: &dyn EntityStore,
    ctx: &RequestContext,
    access: TenantAccess,
    page: Page,
) -> StoreResult<Vec<Tenant>> {
    match access {
        TenantAccess::Global => store.list_tenants(page).await,
        TenantAccess::Scoped => Ok(page.apply(ctx.tenant().cloned())),
    }
}

pub async fn find_tenant(
    store: &dyn EntityStore,
    ctx: &RequestContext,
    access: TenantAccess,
    id: Uuid,
) -> StoreResult<Option<Tenant>> {
    match access {
        TenantAccess::Global => store.get_tenant(id).await,
        TenantAccess::Scoped if ctx.owns(Some(id)) => store.get_tenant(id).await,
        TenantAccess::Scoped => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{NewOwned, NewTenant};
    use crate::database::MemoryStore;

    async fn seeded() -> (MemoryStore, Tenant, Tenant, OwnedRow) {
        let store = MemoryStore::new();
        let t1 = store
            .insert_tenant(NewTenant { name: "One".into(), domain: "one.test".into() })
            .await
            .unwrap();
        let t2 = store
            .insert_tenant(NewTenant { name: "Two".into(), domain: "two.test".into() })
            .await
            .unwrap();
        let org = store
            .insert_owned(EntityKind::Organization, NewOwned { name: "A".into(), parent_id: t1.id })
            .await
            .unwrap();
        let dept = store
            .insert_owned(EntityKind::Department, NewOwned { name: "D".into(), parent_id: org.id })
            .await
            .unwrap();
        let cust = store
            .insert_owned(EntityKind::Customer, NewOwned { name: "C".into(), parent_id: dept.id })
            .await
            .unwrap();
        (store, t1, t2, cust)
    }

    #[tokio::test]
    async fn customers_are_visible_only_to_their_tenant() {
        let (store, t1, t2, cust) = seeded().await;

        let own = RequestContext::for_tenant(t1);
        let other = RequestContext::for_tenant(t2);

        assert_eq!(
            find_owned(&store, &own, EntityKind::Customer, cust.id).await.unwrap(),
            Some(cust.clone())
        );
        assert_eq!(find_owned(&store, &other, EntityKind::Customer, cust.id).await.unwrap(), None);
        assert!(list_owned(&store, &other, EntityKind::Customer, Page::default())
            .await
            .unwrap()
            .is_empty());
        assert_eq!(
            list_owned(&store, &own, EntityKind::Customer, Page::default()).await.unwrap().len(),
            1
        );
    }

    #[tokio::test]
    async fn unresolved_context_matches_nothing() {
        let (store, _, _, cust) = seeded().await;
        let ctx = RequestContext::unresolved();
        for kind in EntityKind::OWNED {
            assert!(list_owned(&store, &ctx, kind, Page::default()).await.unwrap().is_empty());
        }
        assert_eq!(find_owned(&store, &ctx, EntityKind::Customer, cust.id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn scoped_tenant_access_hides_other_tenants() {
        let (store, t1, t2, _) = seeded().await;
        let ctx = RequestContext::for_tenant(t1.clone());

        let all = list_tenants(&store, &ctx, TenantAccess::Global, Page::default()).await.unwrap();
        assert_eq!(all.len(), 2);

        let scoped = list_tenants(&store, &ctx, TenantAccess::Scoped, Page::default()).await.unwrap();
        assert_eq!(scoped, vec![t1.clone()]);

        assert!(find_tenant(&store, &ctx, TenantAccess::Scoped, t2.id).await.unwrap().is_none());
        assert!(find_tenant(&store, &ctx, TenantAccess::Global, t2.id).await.unwrap().is_some());
        assert!(list_tenants(&store, &RequestContext::unresolved(), TenantAccess::Scoped, Page::default())
            .await
            .unwrap()
            .is_empty());
    }
}
