use axum::{
    http::HeaderValue,
    middleware,
    routing::{get, MethodRouter},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::{AppConfig, Environment};
use crate::database::models::{Customer, Department, Organization, OwnedEntity};
use crate::handlers::{owned, public, tenants};
use crate::middleware::{jwt_auth_middleware, resolve_tenant_middleware};
use crate::state::AppState;

/// The complete HTTP application.
///
/// Tenant resolution wraps every route; `/api` routes additionally require a
/// bearer token, which is checked before any body is read.
pub fn app(state: AppState) -> Router {
    let api = Router::new()
        .merge(tenant_routes())
        .merge(owned_routes::<Organization>("organizations"))
        .merge(owned_routes::<Department>("departments"))
        .merge(owned_routes::<Customer>("customers"))
        .route_layer(middleware::from_fn_with_state(state.clone(), jwt_auth_middleware));

    Router::new()
        // Public
        .route("/", get(public::root))
        .route("/health", get(public::health))
        // Protected API
        .merge(api)
        // Global middleware
        .layer(middleware::from_fn_with_state(state.clone(), resolve_tenant_middleware))
        .layer(cors_layer(&state.config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Registers `path` both with and without a trailing slash.
fn route_both(router: Router<AppState>, path: &str, handlers: MethodRouter<AppState>) -> Router<AppState> {
    router
        .route(path, handlers.clone())
        .route(&format!("{}/", path), handlers)
}

fn tenant_routes() -> Router<AppState> {
    let router = route_both(
        Router::new(),
        "/api/tenants",
        get(tenants::list).post(tenants::create),
    );
    route_both(
        router,
        "/api/tenants/:id",
        get(tenants::retrieve)
            .put(tenants::replace)
            .patch(tenants::patch)
            .delete(tenants::destroy),
    )
}

fn owned_routes<E: OwnedEntity>(collection: &str) -> Router<AppState> {
    let base = format!("/api/{}", collection);
    let router = route_both(
        Router::new(),
        &base,
        get(owned::list::<E>).post(owned::create::<E>),
    );
    route_both(
        router,
        &format!("{}/:id", base),
        get(owned::retrieve::<E>)
            .put(owned::replace::<E>)
            .patch(owned::patch::<E>)
            .delete(owned::destroy::<E>),
    )
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origins = &config.security.cors_origins;
    if config.environment == Environment::Development || origins.iter().any(|origin| origin == "*") {
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods(Any)
        .allow_headers(Any)
}
