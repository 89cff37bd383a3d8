use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap},
};
use std::convert::Infallible;
use uuid::Uuid;

use crate::database::models::Tenant;
use crate::database::EntityStore;

/// Header carrying the caller's tenant domain. Header names are
/// case-insensitive, so this also matches `X-Tenant-Domain`.
pub const TENANT_HEADER: &str = "x-tenant-domain";

/// Per-request tenant scope. Built once by [`resolve`] and passed by reference
/// into every scoped query and ownership check.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    tenant: Option<Tenant>,
}

impl RequestContext {
    /// Context for a request whose tenant could not be resolved. Matches no
    /// tenant-owned record.
    pub fn unresolved() -> Self {
        Self { tenant: None }
    }

    pub fn for_tenant(tenant: Tenant) -> Self {
        Self { tenant: Some(tenant) }
    }

    pub fn tenant(&self) -> Option<&Tenant> {
        self.tenant.as_ref()
    }

    pub fn tenant_id(&self) -> Option<Uuid> {
        self.tenant.as_ref().map(|tenant| tenant.id)
    }

    /// True when `tenant_id` is the resolved tenant. Always false when
    /// unresolved.
    pub fn owns(&self, tenant_id: Option<Uuid>) -> bool {
        matches!((self.tenant_id(), tenant_id), (Some(current), Some(other)) if current == other)
    }
}

/// The trimmed header value, if present, non-empty and visible ASCII.
pub fn tenant_domain(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(TENANT_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|domain| !domain.is_empty())
}

/// Resolves the request's tenant from its headers.
///
/// Never fails: a missing header, an unknown domain and a failed lookup all
/// produce an unresolved context.
pub async fn resolve(store: &dyn EntityStore, headers: &HeaderMap) -> RequestContext {
    let Some(domain) = tenant_domain(headers) else {
        tracing::debug!("No tenant header; request is unscoped");
        return RequestContext::unresolved();
    };

    match store.tenant_by_domain(domain).await {
        Ok(Some(tenant)) => {
            tracing::debug!("Resolved tenant {} ({})", tenant.domain, tenant.id);
            RequestContext::for_tenant(tenant)
        }
        Ok(None) => {
            tracing::debug!("No tenant matches domain '{}'", domain);
            RequestContext::unresolved()
        }
        Err(e) => {
            tracing::error!("Tenant lookup for '{}' failed: {}", domain, e);
            RequestContext::unresolved()
        }
    }
}

/// Handlers take the context as an argument; a request that never passed
/// through the resolver is treated as unresolved.
#[async_trait]
impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<RequestContext>()
            .cloned()
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::NewTenant;
    use crate::database::MemoryStore;
    use axum::http::HeaderValue;

    fn headers(domain: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("X-Tenant-Domain", HeaderValue::from_str(domain).unwrap());
        headers
    }

    #[test]
    fn header_lookup_ignores_case_and_blank_values() {
        assert_eq!(tenant_domain(&headers(" acme.test ")), Some("acme.test"));
        assert_eq!(tenant_domain(&headers("   ")), None);
        assert_eq!(tenant_domain(&HeaderMap::new()), None);
    }

    #[tokio::test]
    async fn resolves_known_domain_only() {
        let store = MemoryStore::new();
        let tenant = store
            .insert_tenant(NewTenant { name: "Acme".into(), domain: "acme.test".into() })
            .await
            .unwrap();

        let ctx = resolve(&store, &headers("acme.test")).await;
        assert_eq!(ctx.tenant_id(), Some(tenant.id));
        assert!(ctx.owns(Some(tenant.id)));

        let ctx = resolve(&store, &headers("unknown.test")).await;
        assert_eq!(ctx, RequestContext::unresolved());

        let ctx = resolve(&store, &HeaderMap::new()).await;
        assert_eq!(ctx, RequestContext::unresolved());
    }

    #[test]
    fn unresolved_owns_nothing() {
        let ctx = RequestContext::unresolved();
        assert!(!ctx.owns(Some(Uuid::new_v4())));
        assert!(!ctx.owns(None));
    }
}
