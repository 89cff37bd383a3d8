use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::state::AppState;
use crate::tenancy;

/// Resolves `X-Tenant-Domain` once per request and stores the resulting
/// [`tenancy::RequestContext`] in the request extensions. Never rejects.
pub async fn resolve_tenant_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let ctx = tenancy::resolve(state.store(), request.headers()).await;
    request.extensions_mut().insert(ctx);
    next.run(request).await
}
