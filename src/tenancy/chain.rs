use uuid::Uuid;

use crate::database::models::EntityKind;
use crate::database::{EntityStore, StoreError, StoreResult};

/// Follows parent references from `(kind, id)` up to the owning tenant.
///
/// Returns `None` when the record (or, for a tenant, the tenant itself) does
/// not exist. One store lookup per ownership hop.
pub async fn effective_tenant(
    store: &dyn EntityStore,
    kind: EntityKind,
    id: Uuid,
) -> StoreResult<Option<Uuid>> {
    let Some(mut link) = kind.parent() else {
        return Ok(store.get_tenant(id).await?.map(|tenant| tenant.id));
    };

    let (mut kind, mut id) = (kind, id);
    loop {
        let Some(parent_id) = store.parent_of(kind, id).await? else {
            return Ok(None);
        };
        if link.kind == EntityKind::Tenant {
            return Ok(Some(parent_id));
        }
        kind = link.kind;
        id = parent_id;
        link = kind.parent().ok_or(StoreError::NotOwned(kind))?;
    }
}
