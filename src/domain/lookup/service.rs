//! The lookup service.
//!
//! Thin orchestration over [`crate::storage::rows`]: each operation loads or
//! checks through the generic row helpers and then runs the lookup-specific
//! hooks that keep the `<lookup_type>_lookup_values` table in step with the
//! registry row. Dependent tables are always touched before the row itself.
//!
//! Every method runs on the connection it is given and never commits. Callers
//! pass a transaction so DDL and DML of one operation land together; see
//! [`crate::app::database_service::DatabaseService`].

use crate::domain::lookup::ddl;
use crate::domain::lookup::{CreateLookup, LookupChanges, LookupRow, UpdateLookup, DATA_COLUMNS};
use crate::error::{Result, ServiceError};
use crate::storage::rows::{self, TableConfig};
use serde_json::Value as JsonValue;
use sqlx::PgConnection;
use tracing::{debug, info, instrument};
use uuid::Uuid;

/// Static configuration of the registry table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupConfig {
    pub table: String,
    /// Primary key column, `uuid` or `lookup_uuid` in existing schemas.
    pub primary_key: String,
    /// Accept a primary key from the caller on create instead of always generating one.
    pub allow_caller_primary_key: bool,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            table: "_lookups".to_string(),
            primary_key: "uuid".to_string(),
            allow_caller_primary_key: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LookupService {
    table: TableConfig,
    allow_caller_primary_key: bool,
}

impl LookupService {
    pub fn new(config: LookupConfig) -> Result<Self> {
        let table = TableConfig::new(config.table, config.primary_key, DATA_COLUMNS)?;
        Ok(Self {
            table,
            allow_caller_primary_key: config.allow_caller_primary_key,
        })
    }

    pub fn table(&self) -> &TableConfig {
        &self.table
    }

    /// Creates the registry table if it does not exist yet.
    pub async fn ensure_registry(&self, conn: &mut PgConnection) -> Result<()> {
        rows::execute(conn, &ddl::registry_table_sql(&self.table)).await
    }

    #[instrument(skip(self, conn, data), fields(lookup_type = %data.lookup_type))]
    pub async fn create(&self, conn: &mut PgConnection, data: CreateLookup) -> Result<LookupRow> {
        let key = self.check_create(conn, &data).await?;
        self.provision_values_table(conn, &data.lookup_type, key)
            .await?;

        debug!("inserting registry row");
        let record = rows::insert_row(conn, &self.table, key, &data.to_columns()).await?;
        let row = self.decode(record)?;
        info!(uuid = %row.uuid, "lookup created");
        Ok(row)
    }

    /// All registry rows, ascending by primary key.
    #[instrument(skip_all)]
    pub async fn find(&self, conn: &mut PgConnection) -> Result<Vec<LookupRow>> {
        let records = rows::find_all(conn, &self.table).await?;
        debug!(count = records.len(), "loaded lookups");
        records.into_iter().map(|r| self.decode(r)).collect()
    }

    #[instrument(skip(self, conn))]
    pub async fn find_one(&self, conn: &mut PgConnection, key: Uuid) -> Result<LookupRow> {
        let record = rows::find_by_primary_key(conn, &self.table, key, false).await?;
        self.decode(record)
    }

    /// Applies the fields of `changes` that differ from the stored row. When none
    /// differ the stored row is returned untouched.
    #[instrument(skip(self, conn, changes), fields(uuid = %key))]
    pub async fn update(
        &self,
        conn: &mut PgConnection,
        key: Uuid,
        changes: UpdateLookup,
    ) -> Result<LookupRow> {
        let current = self.load_for_update(conn, key).await?;
        let changes = changes.effective_changes(&current);
        if changes.is_empty() {
            debug!("no effective changes");
            return Ok(current);
        }

        self.check_update(conn, &changes).await?;
        if let Some(new_type) = &changes.lookup_type {
            self.rename_values_table(conn, &current.lookup_type, new_type)
                .await?;
        }

        debug!("updating registry row");
        let record = rows::update_row(conn, &self.table, key, &changes.to_columns()).await?;
        let row = self.decode(record)?;
        info!(lookup_type = %row.lookup_type, "lookup updated");
        Ok(row)
    }

    #[instrument(skip(self, conn), fields(uuid = %key))]
    pub async fn delete(&self, conn: &mut PgConnection, key: Uuid) -> Result<()> {
        let current = self.load_for_update(conn, key).await?;
        // TODO: refuse the delete while other tables still reference this lookup type.
        self.drop_values_table(conn, &current.lookup_type).await?;

        debug!("deleting registry row");
        rows::delete_row(conn, &self.table, key).await?;
        info!(lookup_type = %current.lookup_type, "lookup deleted");
        Ok(())
    }

    /// Registry rows whose values table does not exist.
    #[instrument(skip_all)]
    pub async fn missing_values_tables(&self, conn: &mut PgConnection) -> Result<Vec<LookupRow>> {
        let mut missing = Vec::new();
        for row in self.find(conn).await? {
            let table = ddl::values_table_name(&row.lookup_type)?;
            if !rows::relation_exists(conn, &table).await? {
                missing.push(row);
            }
        }
        Ok(missing)
    }

    async fn load_for_update(&self, conn: &mut PgConnection, key: Uuid) -> Result<LookupRow> {
        let record = rows::find_by_primary_key(conn, &self.table, key, true).await?;
        self.decode(record)
    }

    /// Resolves the primary key for a new row and checks the unique keys.
    async fn check_create(&self, conn: &mut PgConnection, data: &CreateLookup) -> Result<Uuid> {
        ddl::values_table_name(&data.lookup_type)?;
        require_meaning(&data.meaning)?;

        let key = match data.uuid {
            Some(_) if !self.allow_caller_primary_key => {
                return Err(ServiceError::Validation(
                    "caller-supplied primary key is not accepted".to_string(),
                ));
            }
            Some(key) => {
                debug!(%key, "checking primary key");
                rows::check_primary_key_unused(conn, &self.table, key).await?;
                key
            }
            None => Uuid::new_v4(),
        };

        debug!(lookup_type = %data.lookup_type, "checking unique key lookup_type");
        rows::check_unique_value_unused(
            conn,
            &self.table,
            "lookup_type",
            &JsonValue::from(data.lookup_type.as_str()),
        )
        .await?;

        debug!(meaning = %data.meaning, "checking unique key meaning");
        rows::check_unique_value_unused(
            conn,
            &self.table,
            "meaning",
            &JsonValue::from(data.meaning.as_str()),
        )
        .await?;

        Ok(key)
    }

    async fn check_update(&self, conn: &mut PgConnection, changes: &LookupChanges) -> Result<()> {
        if let Some(lookup_type) = &changes.lookup_type {
            ddl::values_table_name(lookup_type)?;
            debug!(%lookup_type, "checking unique key lookup_type");
            rows::check_unique_value_unused(
                conn,
                &self.table,
                "lookup_type",
                &JsonValue::from(lookup_type.as_str()),
            )
            .await?;
        }
        if let Some(meaning) = &changes.meaning {
            require_meaning(meaning)?;
            debug!(%meaning, "checking unique key meaning");
            rows::check_unique_value_unused(
                conn,
                &self.table,
                "meaning",
                &JsonValue::from(meaning.as_str()),
            )
            .await?;
        }
        Ok(())
    }

    async fn provision_values_table(
        &self,
        conn: &mut PgConnection,
        lookup_type: &str,
        key: Uuid,
    ) -> Result<()> {
        debug!("creating lookup values table");
        rows::execute(conn, &ddl::create_values_table_sql(lookup_type, key)?).await
    }

    async fn rename_values_table(
        &self,
        conn: &mut PgConnection,
        old_type: &str,
        new_type: &str,
    ) -> Result<()> {
        debug!(%old_type, %new_type, "renaming lookup values table");
        rows::execute(conn, &ddl::rename_values_table_sql(old_type, new_type)?).await
    }

    async fn drop_values_table(&self, conn: &mut PgConnection, lookup_type: &str) -> Result<()> {
        debug!("dropping lookup values table");
        rows::execute(conn, &ddl::drop_values_table_sql(lookup_type)?).await
    }

    /// Rows carry the configured key column; [`LookupRow`] always calls it `uuid`.
    fn decode(&self, mut record: JsonValue) -> Result<LookupRow> {
        let pk = self.table.primary_key();
        if pk != "uuid" {
            if let Some(obj) = record.as_object_mut() {
                if let Some(key) = obj.remove(pk) {
                    obj.insert("uuid".to_string(), key);
                }
            }
        }
        Ok(serde_json::from_value(record)?)
    }
}

fn require_meaning(meaning: &str) -> Result<()> {
    if meaning.trim().is_empty() {
        return Err(ServiceError::Validation("meaning must not be empty".to_string()));
    }
    Ok(())
}
