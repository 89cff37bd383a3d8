use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

use super::chain::effective_tenant;
use super::context::RequestContext;
use crate::config::TenantAccess;
use crate::database::models::EntityKind;
use crate::database::{EntityStore, StoreError};

/// Why a write was refused. Every variant is raised before the store is asked
/// to persist anything.
#[derive(Debug, Error)]
pub enum GuardError {
    #[error("'{field}' is required")]
    MissingParent { field: &'static str },

    #[error("{kind} {id} does not belong to the current tenant")]
    ForeignParent { kind: EntityKind, id: Uuid },

    #[error("{kind} {id} does not belong to the current tenant")]
    ForeignRecord { kind: EntityKind, id: Uuid },

    #[error("{kind} {id} not found")]
    NotFound { kind: EntityKind, id: Uuid },

    #[error("{0} records cannot be created through the API")]
    CreateDisabled(EntityKind),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Checks the parent a new (or re-parented) `kind` record would attach to.
///
/// The parent must be present and resolve to the context tenant. A parent that
/// does not exist is refused the same way as one owned by another tenant.
pub async fn authorize_parent(
    store: &dyn EntityStore,
    ctx: &RequestContext,
    kind: EntityKind,
    parent: Option<Uuid>,
) -> Result<Uuid, GuardError> {
    let link = kind.parent().ok_or(StoreError::NotOwned(kind))?;
    let parent_id = parent.ok_or(GuardError::MissingParent { field: link.field })?;

    let owner = effective_tenant(store, link.kind, parent_id).await?;
    if !ctx.owns(owner) {
        warn!(
            "Refused {} write: {} {} is outside tenant {:?}",
            kind,
            link.kind,
            parent_id,
            ctx.tenant_id()
        );
        return Err(GuardError::ForeignParent { kind: link.kind, id: parent_id });
    }

    debug!("{} {} accepted as parent for {}", link.kind, parent_id, kind);
    Ok(parent_id)
}

/// Checks that an existing record may be updated or deleted.
pub async fn authorize_record(
    store: &dyn EntityStore,
    ctx: &RequestContext,
    kind: EntityKind,
    id: Uuid,
) -> Result<(), GuardError> {
    match effective_tenant(store, kind, id).await? {
        None => Err(GuardError::NotFound { kind, id }),
        owner if ctx.owns(owner) => Ok(()),
        _ => {
            warn!("Refused {} {} write outside tenant {:?}", kind, id, ctx.tenant_id());
            Err(GuardError::ForeignRecord { kind, id })
        }
    }
}

pub fn authorize_tenant_create(access: TenantAccess) -> Result<(), GuardError> {
    match access {
        TenantAccess::Global => Ok(()),
        TenantAccess::Scoped => Err(GuardError::CreateDisabled(EntityKind::Tenant)),
    }
}

/// Update/delete check for Tenant records under the configured access mode.
pub async fn authorize_tenant_write(
    store: &dyn EntityStore,
    ctx: &RequestContext,
    access: TenantAccess,
    id: Uuid,
) -> Result<(), GuardError> {
    match access {
        TenantAccess::Global => match store.get_tenant(id).await? {
            Some(_) => Ok(()),
            None => Err(GuardError::NotFound { kind: EntityKind::Tenant, id }),
        },
        TenantAccess::Scoped => authorize_record(store, ctx, EntityKind::Tenant, id).await,
    }
}
