use std::time::Duration;

use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::info;
use uuid::Uuid;

use crate::config::DatabaseConfig;
use crate::database::models::{
    EntityKind, NewOwned, NewTenant, OwnedChanges, OwnedRow, Tenant, TenantChanges,
};
use crate::database::store::{EntityStore, Page, StoreError, StoreResult};

const TENANT_COLUMNS: &str = "id, name, domain, created_at, updated_at";

/// PostgreSQL-backed store. Cascades are enforced by `ON DELETE CASCADE`
/// foreign keys in the schema under `migrations/`.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(config: &DatabaseConfig) -> StoreResult<Self> {
        let url = config
            .url
            .as_deref()
            .ok_or(StoreError::ConfigMissing("DATABASE_URL"))?;
        url::Url::parse(url).map_err(|_| StoreError::InvalidDatabaseUrl)?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(url)
            .await?;

        info!("Created database pool ({} max connections)", config.max_connections);
        Ok(Self::new(pool))
    }

    /// Applies the embedded schema migrations.
    pub async fn migrate(&self) -> StoreResult<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        info!("Database schema is up to date");
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// Quote SQL identifier to prevent injection
fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Child table's parent column, which every owned kind has.
fn parent_column(kind: EntityKind) -> StoreResult<&'static str> {
    kind.parent()
        .map(|link| link.column)
        .ok_or(StoreError::NotOwned(kind))
}

fn owned_columns(kind: EntityKind, alias: &str) -> StoreResult<String> {
    Ok(format!(
        "{alias}.id, {alias}.name, {alias}.{} AS parent_id, {alias}.created_at, {alias}.updated_at",
        quote_identifier(parent_column(kind)?)
    ))
}

/// SELECT over `kind` joined up its ownership chain, ending in a
/// `<tenant column> = $1` predicate. Further predicates start at `$2`.
fn scoped_select(kind: EntityKind) -> StoreResult<String> {
    let mut sql = format!(
        "SELECT {} FROM {} t0",
        owned_columns(kind, "t0")?,
        quote_identifier(kind.table())
    );

    let mut current = kind;
    let mut depth = 0;
    loop {
        let link = current.parent().ok_or(StoreError::NotOwned(kind))?;

        if link.kind == EntityKind::Tenant {
            sql.push_str(&format!(" WHERE t{depth}.{} = $1", quote_identifier(link.column)));
            return Ok(sql);
        }

        sql.push_str(&format!(
            " JOIN {} t{next} ON t{next}.id = t{depth}.{}",
            quote_identifier(link.kind.table()),
            quote_identifier(link.column),
            next = depth + 1,
        ));
        current = link.kind;
        depth += 1;
    }
}

/// Maps constraint violations to domain errors; everything else stays a raw
/// sqlx error for the API layer to log and hide.
fn classify(err: sqlx::Error, kind: EntityKind, parent_id: Option<Uuid>) -> StoreError {
    if let sqlx::Error::Database(db) = &err {
        if db.is_unique_violation() && kind == EntityKind::Tenant {
            return StoreError::Duplicate { field: "domain" };
        }
        if db.is_foreign_key_violation() {
            if let (Some(link), Some(id)) = (kind.parent(), parent_id) {
                return StoreError::MissingParent { kind: link.kind, id };
            }
        }
    }
    StoreError::Sqlx(err)
}

fn limit_param(page: Page) -> Option<i64> {
    page.limit.map(|limit| limit.min(i64::MAX as u64) as i64)
}

fn offset_param(page: Page) -> i64 {
    page.offset.min(i64::MAX as u64) as i64
}

#[async_trait]
impl EntityStore for PgStore {
    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn tenant_by_domain(&self, domain: &str) -> StoreResult<Option<Tenant>> {
        let tenant = sqlx::query_as::<_, Tenant>(&format!(
            "SELECT {TENANT_COLUMNS} FROM tenants WHERE domain = $1"
        ))
        .bind(domain)
        .fetch_optional(&self.pool)
        .await?;
        Ok(tenant)
    }

    async fn get_tenant(&self, id: Uuid) -> StoreResult<Option<Tenant>> {
        let tenant = sqlx::query_as::<_, Tenant>(&format!(
            "SELECT {TENANT_COLUMNS} FROM tenants WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(tenant)
    }

    async fn list_tenants(&self, page: Page) -> StoreResult<Vec<Tenant>> {
        let tenants = sqlx::query_as::<_, Tenant>(&format!(
            "SELECT {TENANT_COLUMNS} FROM tenants ORDER BY created_at, id LIMIT $1 OFFSET $2"
        ))
        .bind(limit_param(page))
        .bind(offset_param(page))
        .fetch_all(&self.pool)
        .await?;
        Ok(tenants)
    }

    async fn insert_tenant(&self, input: NewTenant) -> StoreResult<Tenant> {
        sqlx::query_as::<_, Tenant>(&format!(
            "INSERT INTO tenants (id, name, domain) VALUES ($1, $2, $3) RETURNING {TENANT_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(&input.name)
        .bind(&input.domain)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| classify(e, EntityKind::Tenant, None))
    }

    async fn update_tenant(&self, id: Uuid, changes: TenantChanges) -> StoreResult<Option<Tenant>> {
        sqlx::query_as::<_, Tenant>(&format!(
            "UPDATE tenants
             SET name = COALESCE($2, name), domain = COALESCE($3, domain), updated_at = now()
             WHERE id = $1
             RETURNING {TENANT_COLUMNS}"
        ))
        .bind(id)
        .bind(changes.name)
        .bind(changes.domain)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| classify(e, EntityKind::Tenant, None))
    }

    async fn delete_tenant(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM tenants WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn parent_of(&self, kind: EntityKind, id: Uuid) -> StoreResult<Option<Uuid>> {
        let Some(link) = kind.parent() else {
            return Ok(None);
        };
        let sql = format!(
            "SELECT {} FROM {} WHERE id = $1",
            quote_identifier(link.column),
            quote_identifier(kind.table())
        );
        let parent: Option<(Uuid,)> = sqlx::query_as(&sql).bind(id).fetch_optional(&self.pool).await?;
        Ok(parent.map(|(parent_id,)| parent_id))
    }

    async fn list_owned(&self, kind: EntityKind, tenant_id: Uuid, page: Page) -> StoreResult<Vec<OwnedRow>> {
        let sql = format!(
            "{} ORDER BY t0.created_at, t0.id LIMIT $2 OFFSET $3",
            scoped_select(kind)?
        );
        let rows = sqlx::query_as::<_, OwnedRow>(&sql)
            .bind(tenant_id)
            .bind(limit_param(page))
            .bind(offset_param(page))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn get_owned(&self, kind: EntityKind, id: Uuid, tenant_id: Uuid) -> StoreResult<Option<OwnedRow>> {
        let sql = format!("{} AND t0.id = $2", scoped_select(kind)?);
        let row = sqlx::query_as::<_, OwnedRow>(&sql)
            .bind(tenant_id)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn insert_owned(&self, kind: EntityKind, input: NewOwned) -> StoreResult<OwnedRow> {
        let sql = format!(
            "INSERT INTO {} (id, name, {}) VALUES ($1, $2, $3) RETURNING {}",
            quote_identifier(kind.table()),
            quote_identifier(parent_column(kind)?),
            owned_columns(kind, kind.table())?,
        );
        sqlx::query_as::<_, OwnedRow>(&sql)
            .bind(Uuid::new_v4())
            .bind(&input.name)
            .bind(input.parent_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| classify(e, kind, Some(input.parent_id)))
    }

    async fn update_owned(&self, kind: EntityKind, id: Uuid, changes: OwnedChanges) -> StoreResult<Option<OwnedRow>> {
        let column = quote_identifier(parent_column(kind)?);
        let sql = format!(
            "UPDATE {table} SET name = COALESCE($2, name), {column} = COALESCE($3, {column}), updated_at = now()
             WHERE id = $1
             RETURNING {returning}",
            table = quote_identifier(kind.table()),
            returning = owned_columns(kind, kind.table())?,
        );
        sqlx::query_as::<_, OwnedRow>(&sql)
            .bind(id)
            .bind(changes.name)
            .bind(changes.parent_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| classify(e, kind, changes.parent_id))
    }

    async fn delete_owned(&self, kind: EntityKind, id: Uuid) -> StoreResult<bool> {
        let sql = format!("DELETE FROM {} WHERE id = $1", quote_identifier(kind.table()));
        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn organization_scope_filters_on_own_tenant_column() {
        let sql = scoped_select(EntityKind::Organization).unwrap();
        assert_eq!(
            sql,
            "SELECT t0.id, t0.name, t0.\"tenant_id\" AS parent_id, t0.created_at, t0.updated_at \
             FROM \"organizations\" t0 WHERE t0.\"tenant_id\" = $1"
        );
    }

    #[test]
    fn customer_scope_joins_up_to_organization() {
        let sql = scoped_select(EntityKind::Customer).unwrap();
        assert!(sql.contains("FROM \"customers\" t0"));
        assert!(sql.contains("JOIN \"departments\" t1 ON t1.id = t0.\"department_id\""));
        assert!(sql.contains("JOIN \"organizations\" t2 ON t2.id = t1.\"organization_id\""));
        assert!(sql.ends_with("WHERE t2.\"tenant_id\" = $1"));
    }

    #[test]
    fn tenants_are_not_scoped_through_joins() {
        assert!(scoped_select(EntityKind::Tenant).is_err());
    }

    #[test]
    fn quotes_identifiers() {
        assert_eq!(quote_identifier("tenants"), "\"tenants\"");
        assert_eq!(quote_identifier("a\"b"), "\"a\"\"b\"");
    }
}
