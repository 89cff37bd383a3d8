// handlers/tenants.rs - /api/tenants
//
// Visibility follows `tenancy.tenant_access`: `global` exposes every tenant to
// any authenticated caller, `scoped` only the one named by X-Tenant-Domain.

use axum::extract::{Extension, Path, State};
use tracing::info;

use super::extract::{optional_text, parse_id, required_text, ApiJson, ListQuery};
use crate::database::models::{EntityKind, NewTenant, Tenant, TenantChanges, TenantPayload};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;
use crate::tenancy::{guard, scope, RequestContext};

fn not_found() -> ApiError {
    ApiError::not_found(format!("{} not found", EntityKind::Tenant))
}

/// GET /api/tenants/
pub async fn list(
    State(state): State<AppState>,
    ctx: RequestContext,
    query: ListQuery,
) -> ApiResult<Vec<Tenant>> {
    let page = query.page(state.config.api.max_list_limit);
    let access = state.config.tenancy.tenant_access;
    let tenants = scope::list_tenants(state.store(), &ctx, access, page).await?;
    Ok(ApiResponse::success(tenants))
}

/// GET /api/tenants/:id/
pub async fn retrieve(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(raw_id): Path<String>,
) -> ApiResult<Tenant> {
    let id = parse_id(EntityKind::Tenant, &raw_id)?;
    let access = state.config.tenancy.tenant_access;
    scope::find_tenant(state.store(), &ctx, access, id)
        .await?
        .map(ApiResponse::success)
        .ok_or_else(not_found)
}

/// POST /api/tenants/
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiJson(payload): ApiJson<TenantPayload>,
) -> ApiResult<Tenant> {
    guard::authorize_tenant_create(state.config.tenancy.tenant_access)?;
    let name = required_text("name", payload.name.as_deref())?;
    let domain = required_text("domain", payload.domain.as_deref())?;

    let tenant = state.store().insert_tenant(NewTenant { name, domain }).await?;
    info!("{} created tenant {} ({})", user.name, tenant.domain, tenant.id);
    Ok(ApiResponse::created(tenant))
}

/// PUT /api/tenants/:id/
pub async fn replace(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(raw_id): Path<String>,
    ApiJson(payload): ApiJson<TenantPayload>,
) -> ApiResult<Tenant> {
    let id = parse_id(EntityKind::Tenant, &raw_id)?;
    guard::authorize_tenant_write(state.store(), &ctx, state.config.tenancy.tenant_access, id).await?;

    let changes = TenantChanges {
        name: Some(required_text("name", payload.name.as_deref())?),
        domain: Some(required_text("domain", payload.domain.as_deref())?),
    };
    update(&state, id, changes).await
}

/// PATCH /api/tenants/:id/
pub async fn patch(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(raw_id): Path<String>,
    ApiJson(payload): ApiJson<TenantPayload>,
) -> ApiResult<Tenant> {
    let id = parse_id(EntityKind::Tenant, &raw_id)?;
    guard::authorize_tenant_write(state.store(), &ctx, state.config.tenancy.tenant_access, id).await?;

    let changes = TenantChanges {
        name: optional_text("name", payload.name.as_deref())?,
        domain: optional_text("domain", payload.domain.as_deref())?,
    };
    update(&state, id, changes).await
}

async fn update(state: &AppState, id: uuid::Uuid, changes: TenantChanges) -> ApiResult<Tenant> {
    let tenant = state.store().update_tenant(id, changes).await?.ok_or_else(not_found)?;
    info!("Updated tenant {} ({})", tenant.domain, tenant.id);
    Ok(ApiResponse::success(tenant))
}

/// DELETE /api/tenants/:id/ - cascades through the whole hierarchy
pub async fn destroy(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ctx: RequestContext,
    Path(raw_id): Path<String>,
) -> ApiResult<()> {
    let id = parse_id(EntityKind::Tenant, &raw_id)?;
    guard::authorize_tenant_write(state.store(), &ctx, state.config.tenancy.tenant_access, id).await?;

    if !state.store().delete_tenant(id).await? {
        return Err(not_found());
    }
    info!("{} deleted tenant {}", user.name, id);
    Ok(ApiResponse::no_content())
}
