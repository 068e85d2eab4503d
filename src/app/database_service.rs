//! The Lookup Data Service.
//!
//! Owns the connection pool and gives every [`LookupService`] operation its own
//! transaction:
//! 1.  `BEGIN`
//! 2.  the operation's checks, DDL and DML on that transaction
//! 3.  `COMMIT`, or rollback when the transaction is dropped on error
//!
//! Postgres DDL is transactional, so a failed row write also undoes the
//! create/rename/drop of the values table issued before it.

use crate::domain::lookup::{CreateLookup, LookupRow, LookupService, UpdateLookup};
use crate::error::Result;
use crate::infra::config::AppConfig;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

pub struct DatabaseService {
    pool: PgPool,
    lookups: LookupService,
}

impl DatabaseService {
    /// Connects using `config` and makes sure the registry table exists.
    pub async fn connect(config: &AppConfig) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.database_url)
            .await?;
        let lookups = LookupService::new(config.lookup.clone())?;
        let service = Self::from_pool(pool, lookups);
        service.ensure_registry().await?;
        info!(table = service.lookups.table().table(), "lookup registry ready");
        Ok(service)
    }

    /// Wraps an existing pool. Does not touch the schema.
    pub fn from_pool(pool: PgPool, lookups: LookupService) -> Self {
        Self { pool, lookups }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn lookups(&self) -> &LookupService {
        &self.lookups
    }

    pub async fn ensure_registry(&self) -> Result<()> {
        let mut conn = self.pool.acquire().await?;
        self.lookups.ensure_registry(&mut conn).await
    }

    pub async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    pub async fn create(&self, data: CreateLookup) -> Result<LookupRow> {
        let mut tx = self.pool.begin().await?;
        let row = self.lookups.create(&mut tx, data).await?;
        tx.commit().await?;
        Ok(row)
    }

    pub async fn find(&self) -> Result<Vec<LookupRow>> {
        let mut conn = self.pool.acquire().await?;
        self.lookups.find(&mut conn).await
    }

    pub async fn find_one(&self, key: Uuid) -> Result<LookupRow> {
        let mut conn = self.pool.acquire().await?;
        self.lookups.find_one(&mut conn, key).await
    }

    pub async fn update(&self, key: Uuid, changes: UpdateLookup) -> Result<LookupRow> {
        let mut tx = self.pool.begin().await?;
        let row = self.lookups.update(&mut tx, key, changes).await?;
        tx.commit().await?;
        Ok(row)
    }

    pub async fn delete(&self, key: Uuid) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        self.lookups.delete(&mut tx, key).await?;
        tx.commit().await?;
        Ok(())
    }

    pub async fn missing_values_tables(&self) -> Result<Vec<LookupRow>> {
        let mut conn = self.pool.acquire().await?;
        self.lookups.missing_values_tables(&mut conn).await
    }
}
