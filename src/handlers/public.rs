// handlers/public.rs - unauthenticated service endpoints

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET / - service information
pub async fn root() -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "name": "Tenancy API",
            "version": env!("CARGO_PKG_VERSION"),
            "description": "Multi-tenant organization hierarchy API",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "tenants": "/api/tenants[/:id] (protected)",
                "organizations": "/api/organizations[/:id] (protected)",
                "departments": "/api/departments[/:id] (protected)",
                "customers": "/api/customers[/:id] (protected)",
            },
            "headers": {
                "authorization": "Bearer <jwt>",
                "tenant": "X-Tenant-Domain: <domain>",
            }
        }
    }))
}

/// GET /health - 200 when the store answers, 503 otherwise
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.store().ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": "database unavailable",
                    "data": {
                        "status": "degraded",
                        "timestamp": now
                    }
                })),
            )
        }
    }
}
