// handlers/owned.rs - CRUD for Organization, Department and Customer
//
// One generic handler per operation; the router instantiates each for the
// concrete entity type. Reads go through tenancy::scope, writes through
// tenancy::guard before the store is touched.

use axum::extract::{Extension, Path, State};
use tracing::info;

use super::extract::{optional_text, parse_id, required_text, ApiJson, ListQuery};
use crate::database::models::{NewOwned, OwnedChanges, OwnedEntity, OwnedPayload};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;
use crate::tenancy::{guard, scope, RequestContext};

/// GET /api/{entities}/
pub async fn list<E: OwnedEntity>(
    State(state): State<AppState>,
    ctx: RequestContext,
    query: ListQuery,
) -> ApiResult<Vec<E>> {
    let page = query.page(state.config.api.max_list_limit);
    let rows = scope::list_owned(state.store(), &ctx, E::KIND, page).await?;
    Ok(ApiResponse::success(rows.into_iter().map(E::from).collect()))
}

/// GET /api/{entities}/:id/
pub async fn retrieve<E: OwnedEntity>(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(raw_id): Path<String>,
) -> ApiResult<E> {
    let id = parse_id(E::KIND, &raw_id)?;
    scope::find_owned(state.store(), &ctx, E::KIND, id)
        .await?
        .map(|row| ApiResponse::success(E::from(row)))
        .ok_or_else(|| ApiError::not_found(format!("{} not found", E::KIND)))
}

/// POST /api/{entities}/
pub async fn create<E: OwnedEntity>(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ctx: RequestContext,
    ApiJson(payload): ApiJson<E::Payload>,
) -> ApiResult<E> {
    let store = state.store();
    let parent_id = guard::authorize_parent(store, &ctx, E::KIND, payload.parent()).await?;
    let name = required_text("name", payload.name())?;

    let row = store.insert_owned(E::KIND, NewOwned { name, parent_id }).await?;
    info!("{} created {} {} under {}", user.name, E::KIND, row.id, parent_id);
    Ok(ApiResponse::created(E::from(row)))
}

/// PUT /api/{entities}/:id/ - full replacement, parent included
pub async fn replace<E: OwnedEntity>(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(raw_id): Path<String>,
    ApiJson(payload): ApiJson<E::Payload>,
) -> ApiResult<E> {
    let store = state.store();
    let id = parse_id(E::KIND, &raw_id)?;
    guard::authorize_record(store, &ctx, E::KIND, id).await?;
    let parent_id = guard::authorize_parent(store, &ctx, E::KIND, payload.parent()).await?;
    let name = required_text("name", payload.name())?;

    let changes = OwnedChanges {
        name: Some(name),
        parent_id: Some(parent_id),
    };
    update::<E>(&state, id, changes).await
}

/// PATCH /api/{entities}/:id/ - only the fields present in the body
pub async fn patch<E: OwnedEntity>(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(raw_id): Path<String>,
    ApiJson(payload): ApiJson<E::Payload>,
) -> ApiResult<E> {
    let store = state.store();
    let id = parse_id(E::KIND, &raw_id)?;
    guard::authorize_record(store, &ctx, E::KIND, id).await?;

    let parent_id = match payload.parent() {
        Some(parent) => Some(guard::authorize_parent(store, &ctx, E::KIND, Some(parent)).await?),
        None => None,
    };
    let name = optional_text("name", payload.name())?;

    update::<E>(&state, id, OwnedChanges { name, parent_id }).await
}

async fn update<E: OwnedEntity>(state: &AppState, id: uuid::Uuid, changes: OwnedChanges) -> ApiResult<E> {
    let row = state
        .store()
        .update_owned(E::KIND, id, changes)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("{} not found", E::KIND)))?;
    info!("Updated {} {}", E::KIND, id);
    Ok(ApiResponse::success(E::from(row)))
}

/// DELETE /api/{entities}/:id/ - removes the record and its descendants
pub async fn destroy<E: OwnedEntity>(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ctx: RequestContext,
    Path(raw_id): Path<String>,
) -> ApiResult<()> {
    let store = state.store();
    let id = parse_id(E::KIND, &raw_id)?;
    guard::authorize_record(store, &ctx, E::KIND, id).await?;

    if !store.delete_owned(E::KIND, id).await? {
        return Err(ApiError::not_found(format!("{} not found", E::KIND)));
    }
    info!("{} deleted {} {}", user.name, E::KIND, id);
    Ok(ApiResponse::no_content())
}
