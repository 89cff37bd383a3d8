mod common;

use anyhow::Result;
use axum::http::{Method, StatusCode};
use serde_json::json;
use uuid::Uuid;

use common::{TestApp, T1};
use tenancy_api::auth::{generate_jwt, Claims};

const ENDPOINTS: [&str; 4] = [
    "/api/tenants/",
    "/api/organizations/",
    "/api/departments/",
    "/api/customers/",
];

#[tokio::test]
async fn missing_token_is_unauthorized_regardless_of_tenant() -> Result<()> {
    let app = TestApp::new().await?;

    for uri in ENDPOINTS {
        for tenant in [Some(T1), None] {
            let res = app.send(Method::GET, uri, tenant, None, None).await?;
            assert_eq!(res.status, StatusCode::UNAUTHORIZED, "{} {:?}", uri, tenant);
            assert_eq!(res.body["code"], "UNAUTHORIZED");
        }
    }
    Ok(())
}

#[tokio::test]
async fn bad_tokens_are_unauthorized() -> Result<()> {
    let app = TestApp::new().await?;
    let forged = generate_jwt(&Claims::new("mallory", Uuid::new_v4(), 1)?, "some-other-secret")?;

    for authorization in [
        "Bearer not-a-jwt".to_string(),
        format!("Bearer {}", forged),
        format!("Token {}", app.token),
        "Bearer ".to_string(),
    ] {
        let res = app
            .send(Method::GET, "/api/customers/", Some(T1), Some(&authorization), None)
            .await?;
        assert_eq!(res.status, StatusCode::UNAUTHORIZED, "{}", authorization);
    }
    Ok(())
}

#[tokio::test]
async fn auth_is_checked_before_the_body() -> Result<()> {
    let app = TestApp::new().await?;

    // Would be a 403 (foreign parent) if it got past authentication.
    let res = app
        .send(
            Method::POST,
            "/api/departments/",
            Some(T1),
            None,
            Some(json!({ "name": "X", "organization": app.org_b.id })),
        )
        .await?;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(app.get("/api/departments/", Some(T1)).await?.data().as_array().map(Vec::len), Some(1));
    Ok(())
}

#[tokio::test]
async fn valid_token_is_accepted() -> Result<()> {
    let app = TestApp::new().await?;
    let res = app.get("/api/customers/", Some(T1)).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["success"], true);
    Ok(())
}

#[tokio::test]
async fn lowercase_scheme_is_accepted() -> Result<()> {
    let app = TestApp::new().await?;
    let authorization = format!("bearer {}", app.token);
    let res = app
        .send(Method::GET, "/api/customers/", Some(T1), Some(&authorization), None)
        .await?;
    assert_eq!(res.status, StatusCode::OK);
    Ok(())
}
