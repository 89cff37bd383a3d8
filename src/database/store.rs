use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::database::models::{
    EntityKind, NewOwned, NewTenant, OwnedChanges, OwnedRow, Tenant, TenantChanges,
};

/// Errors from an EntityStore
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("Duplicate value for unique field '{field}'")]
    Duplicate { field: &'static str },

    #[error("{kind} {id} does not exist")]
    MissingParent { kind: EntityKind, id: Uuid },

    #[error("{0} is not owned by another entity")]
    NotOwned(EntityKind),

    #[error(transparent)]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Window over an ordered list result. `limit: None` returns everything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Page {
    pub limit: Option<u64>,
    pub offset: u64,
}

impl Page {
    pub fn new(limit: Option<u64>, offset: u64) -> Self {
        Self { limit, offset }
    }

    /// Applies the window to an already ordered iterator.
    pub fn apply<T>(&self, items: impl IntoIterator<Item = T>) -> Vec<T> {
        let skipped = items.into_iter().skip(self.offset as usize);
        match self.limit {
            Some(limit) => skipped.take(limit as usize).collect(),
            None => skipped.collect(),
        }
    }
}

/// Persistence for the tenant hierarchy.
///
/// Owned-record methods take the `EntityKind` of the row they operate on and
/// are only meaningful for the three owned kinds. Deletes cascade to every
/// descendant. Scoped reads (`list_owned`, `get_owned`) return only rows whose
/// ownership chain ends at `tenant_id`.
#[async_trait]
pub trait EntityStore: Send + Sync {
    async fn ping(&self) -> StoreResult<()>;

    async fn tenant_by_domain(&self, domain: &str) -> StoreResult<Option<Tenant>>;
    async fn get_tenant(&self, id: Uuid) -> StoreResult<Option<Tenant>>;
    async fn list_tenants(&self, page: Page) -> StoreResult<Vec<Tenant>>;
    async fn insert_tenant(&self, input: NewTenant) -> StoreResult<Tenant>;
    async fn update_tenant(&self, id: Uuid, changes: TenantChanges) -> StoreResult<Option<Tenant>>;
    async fn delete_tenant(&self, id: Uuid) -> StoreResult<bool>;

    /// One ownership hop: the parent id recorded on the row, or `None` when
    /// the row does not exist.
    async fn parent_of(&self, kind: EntityKind, id: Uuid) -> StoreResult<Option<Uuid>>;

    async fn list_owned(&self, kind: EntityKind, tenant_id: Uuid, page: Page) -> StoreResult<Vec<OwnedRow>>;
    async fn get_owned(&self, kind: EntityKind, id: Uuid, tenant_id: Uuid) -> StoreResult<Option<OwnedRow>>;
    async fn insert_owned(&self, kind: EntityKind, input: NewOwned) -> StoreResult<OwnedRow>;
    async fn update_owned(&self, kind: EntityKind, id: Uuid, changes: OwnedChanges) -> StoreResult<Option<OwnedRow>>;
    async fn delete_owned(&self, kind: EntityKind, id: Uuid) -> StoreResult<bool>;
}
