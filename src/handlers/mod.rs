// handlers/mod.rs - HTTP handlers
//
// Public endpoints need no credentials; everything under /api is wrapped in the
// JWT middleware by the router and receives the resolved RequestContext.
pub mod extract;
pub mod owned;
pub mod public;
pub mod tenants;
