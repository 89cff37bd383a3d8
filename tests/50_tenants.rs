mod common;

use anyhow::Result;
use axum::http::{Method, StatusCode};
use serde_json::json;

use common::{TestApp, T1, T2};
use tenancy_api::config::TenantAccess;

#[tokio::test]
async fn global_access_lists_every_tenant() -> Result<()> {
    let app = TestApp::new().await?;

    for tenant in [Some(T1), None] {
        let res = app.get("/api/tenants/", tenant).await?;
        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(TestApp::ids(&res), vec![app.t1.id, app.t2.id]);
    }

    let res = app.get(&format!("/api/tenants/{}/", app.t2.id), Some(T1)).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data()["domain"], T2);
    Ok(())
}

#[tokio::test]
async fn create_and_update_tenant() -> Result<()> {
    let app = TestApp::new().await?;

    let res = app
        .call(Method::POST, "/api/tenants/", None, Some(json!({ "name": "Tenant 3", "domain": "tenant3.com" })))
        .await?;
    assert_eq!(res.status, StatusCode::CREATED);
    let id = res.id()?;

    // The new domain resolves immediately.
    let res = app.get("/api/organizations/", Some("tenant3.com")).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert!(TestApp::ids(&res).is_empty());

    let res = app
        .call(Method::PATCH, &format!("/api/tenants/{}/", id), None, Some(json!({ "name": "Renamed" })))
        .await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.data()["name"], "Renamed");
    assert_eq!(res.data()["domain"], "tenant3.com");

    let res = app
        .call(Method::PUT, &format!("/api/tenants/{}/", id), None, Some(json!({ "name": "Renamed" })))
        .await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(res.body["field_errors"]["domain"].is_string());
    Ok(())
}

#[tokio::test]
async fn duplicate_domain_is_a_field_error() -> Result<()> {
    let app = TestApp::new().await?;

    let res = app
        .call(Method::POST, "/api/tenants/", None, Some(json!({ "name": "Copy", "domain": T1 })))
        .await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(res.body["field_errors"]["domain"].is_string());

    let res = app
        .call(Method::PATCH, &format!("/api/tenants/{}", app.t2.id), None, Some(json!({ "domain": T1 })))
        .await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn deleting_a_tenant_cascades_to_its_hierarchy() -> Result<()> {
    let app = TestApp::new().await?;

    let res = app.call(Method::DELETE, &format!("/api/tenants/{}/", app.t1.id), None, None).await?;
    assert_eq!(res.status, StatusCode::NO_CONTENT);

    let res = app.get(&format!("/api/tenants/{}/", app.t1.id), None).await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);

    // The domain no longer resolves, so nothing is visible under it.
    assert!(TestApp::ids(&app.get("/api/customers/", Some(T1)).await?).is_empty());
    assert_eq!(TestApp::ids(&app.get("/api/organizations/", Some(T2)).await?), vec![app.org_b.id]);
    Ok(())
}

#[tokio::test]
async fn scoped_access_confines_tenants_to_the_context() -> Result<()> {
    let app = TestApp::with_access(TenantAccess::Scoped).await?;

    let res = app.get("/api/tenants/", Some(T1)).await?;
    assert_eq!(TestApp::ids(&res), vec![app.t1.id]);

    assert!(TestApp::ids(&app.get("/api/tenants/", None).await?).is_empty());

    let res = app.get(&format!("/api/tenants/{}/", app.t2.id), Some(T1)).await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);

    let res = app
        .call(Method::PATCH, &format!("/api/tenants/{}/", app.t2.id), Some(T1), Some(json!({ "name": "Mine" })))
        .await?;
    assert_eq!(res.status, StatusCode::FORBIDDEN);

    let res = app.call(Method::DELETE, &format!("/api/tenants/{}/", app.t2.id), Some(T1), None).await?;
    assert_eq!(res.status, StatusCode::FORBIDDEN);

    let res = app
        .call(Method::POST, "/api/tenants/", Some(T1), Some(json!({ "name": "New", "domain": "new.com" })))
        .await?;
    assert_eq!(res.status, StatusCode::FORBIDDEN);

    let res = app
        .call(Method::PATCH, &format!("/api/tenants/{}/", app.t1.id), Some(T1), Some(json!({ "name": "Own" })))
        .await?;
    assert_eq!(res.status, StatusCode::OK);
    Ok(())
}
