#![allow(dead_code)]

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use tenancy_api::auth::{generate_jwt, Claims};
use tenancy_api::config::{AppConfig, TenantAccess};
use tenancy_api::database::models::{EntityKind, NewOwned, NewTenant, OwnedRow, Tenant};
use tenancy_api::database::{EntityStore, MemoryStore};
use tenancy_api::{app, AppState};

pub const T1: &str = "tenant1.com";
pub const T2: &str = "tenant2.com";
pub const SECRET: &str = "integration-test-secret";

/// Router over a seeded in-memory store:
///
/// ```text
/// tenant1.com ── Org A ── Dept A ── Cust A
/// tenant2.com ── Org B
/// ```
pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
    pub token: String,
    pub t1: Tenant,
    pub t2: Tenant,
    pub org_a: OwnedRow,
    pub org_b: OwnedRow,
    pub dept_a: OwnedRow,
    pub cust_a: OwnedRow,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestResponse {
    /// The `data` member of a success envelope.
    pub fn data(&self) -> &Value {
        &self.body["data"]
    }

    pub fn id(&self) -> Result<Uuid> {
        let raw = self.data()["id"].as_str().context("response has no data.id")?;
        Ok(Uuid::parse_str(raw)?)
    }
}

impl TestApp {
    pub async fn new() -> Result<Self> {
        Self::with_access(TenantAccess::Global).await
    }

    pub async fn with_access(access: TenantAccess) -> Result<Self> {
        let store = Arc::new(MemoryStore::new());

        let t1 = store
            .insert_tenant(NewTenant { name: "Tenant 1".into(), domain: T1.into() })
            .await?;
        let t2 = store
            .insert_tenant(NewTenant { name: "Tenant 2".into(), domain: T2.into() })
            .await?;
        let org_a = store
            .insert_owned(EntityKind::Organization, NewOwned { name: "Org A".into(), parent_id: t1.id })
            .await?;
        let org_b = store
            .insert_owned(EntityKind::Organization, NewOwned { name: "Org B".into(), parent_id: t2.id })
            .await?;
        let dept_a = store
            .insert_owned(EntityKind::Department, NewOwned { name: "Dept A".into(), parent_id: org_a.id })
            .await?;
        let cust_a = store
            .insert_owned(EntityKind::Customer, NewOwned { name: "Cust A".into(), parent_id: dept_a.id })
            .await?;

        let mut config = AppConfig::development();
        config.security.jwt_secret = SECRET.to_string();
        config.tenancy.tenant_access = access;

        let token = generate_jwt(&Claims::new("tester", Uuid::new_v4(), 1)?, SECRET)?;
        let shared: Arc<dyn EntityStore> = store.clone();
        let router = app(AppState::new(shared, config));

        Ok(Self { router, store, token, t1, t2, org_a, org_b, dept_a, cust_a })
    }

    /// Authenticated request, optionally scoped with `X-Tenant-Domain`.
    pub async fn call(
        &self,
        method: Method,
        uri: &str,
        tenant: Option<&str>,
        body: Option<Value>,
    ) -> Result<TestResponse> {
        let bearer = format!("Bearer {}", self.token);
        self.send(method, uri, tenant, Some(&bearer), body).await
    }

    pub async fn get(&self, uri: &str, tenant: Option<&str>) -> Result<TestResponse> {
        self.call(Method::GET, uri, tenant, None).await
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        tenant: Option<&str>,
        authorization: Option<&str>,
        body: Option<Value>,
    ) -> Result<TestResponse> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(domain) = tenant {
            builder = builder.header("X-Tenant-Domain", domain);
        }
        if let Some(value) = authorization {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&json)?))?,
            None => builder.body(Body::empty())?,
        };

        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).context("response body is not JSON")?
        };

        Ok(TestResponse { status, body })
    }

    /// Ids in the `data` array of a list response.
    pub fn ids(response: &TestResponse) -> Vec<Uuid> {
        response
            .data()
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| item["id"].as_str())
                    .filter_map(|id| Uuid::parse_str(id).ok())
                    .collect()
            })
            .unwrap_or_default()
    }
}
