//! Tenant isolation.
//!
//! Every request is reduced to a [`RequestContext`] by [`resolve`]. Reads go
//! through [`scope`], which never returns rows outside the context tenant;
//! writes go through [`guard`], which checks ownership before anything is
//! persisted. Both rely on [`chain::effective_tenant`] and the parent links
//! declared on `EntityKind`.

pub mod chain;
pub mod context;
pub mod guard;
pub mod scope;

pub use chain::effective_tenant;
pub use context::{resolve, RequestContext, TENANT_HEADER};
pub use guard::GuardError;
