//! Generic row CRUD for a single table described by a [`TableConfig`].
//!
//! Rows come back as JSON (`row_to_json(t.*)`) and callers decode them with serde.
//! Every statement runs on the connection handed in, so a caller holding a
//! transaction gets all of its reads, checks and writes inside that transaction.

use crate::domain::ident::validate_identifier;
use crate::error::{Result, ServiceError};
use serde_json::{Map, Value as JsonValue};
use sqlx::{PgConnection, Postgres, QueryBuilder};
use tracing::debug;
use uuid::Uuid;

/// Static shape of a table: name, primary key column and the data columns the
/// helpers are allowed to write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableConfig {
    table: String,
    primary_key: String,
    columns: Vec<String>,
}

impl TableConfig {
    pub fn new(
        table: impl Into<String>,
        primary_key: impl Into<String>,
        columns: impl IntoIterator<Item = impl Into<String>>,
    ) -> Result<Self> {
        let table = table.into();
        let primary_key = primary_key.into();
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();

        validate_identifier(&table)?;
        validate_identifier(&primary_key)?;
        for c in &columns {
            validate_identifier(c)?;
            if *c == primary_key {
                return Err(ServiceError::Validation(format!(
                    "column '{}' duplicates the primary key",
                    c
                )));
            }
        }

        Ok(Self {
            table,
            primary_key,
            columns,
        })
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn primary_key(&self) -> &str {
        &self.primary_key
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    fn ensure_column(&self, column: &str) -> Result<()> {
        if self.columns.iter().any(|c| c == column) {
            Ok(())
        } else {
            Err(ServiceError::Validation(format!(
                "'{}' is not a column of {}",
                column, self.table
            )))
        }
    }

    /// Configured columns present in `data`, in configuration order.
    fn writable<'a>(&'a self, data: &'a Map<String, JsonValue>) -> Vec<(&'a str, &'a JsonValue)> {
        self.columns
            .iter()
            .filter_map(|c| data.get(c).map(|v| (c.as_str(), v)))
            .collect()
    }

    fn push_select(&self, qb: &mut QueryBuilder<'_, Postgres>) {
        qb.push("SELECT row_to_json(t.*) AS record FROM ")
            .push(&self.table)
            .push(" t");
    }
}

fn push_value(qb: &mut QueryBuilder<'_, Postgres>, value: &JsonValue) {
    match value {
        JsonValue::Null => {
            qb.push_bind(Option::<String>::None);
        }
        JsonValue::Bool(b) => {
            qb.push_bind(*b);
        }
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                qb.push_bind(i);
            } else if let Some(f) = n.as_f64() {
                qb.push_bind(f);
            } else {
                qb.push_bind(n.to_string());
            }
        }
        JsonValue::String(s) => {
            qb.push_bind(s.clone());
        }
        other => {
            qb.push_bind(other.clone());
        }
    }
}

/// Runs a statement that returns no rows (DDL, mostly).
pub async fn execute(conn: &mut PgConnection, sql: &str) -> Result<()> {
    debug!(sql, "executing statement");
    sqlx::query(sql).execute(&mut *conn).await?;
    Ok(())
}

/// Whether a table (or any relation) called `name` is visible on the search path.
pub async fn relation_exists(conn: &mut PgConnection, name: &str) -> Result<bool> {
    let exists: bool = sqlx::query_scalar("SELECT to_regclass($1) IS NOT NULL")
        .bind(name)
        .fetch_one(&mut *conn)
        .await?;
    Ok(exists)
}

pub async fn check_primary_key_unused(
    conn: &mut PgConnection,
    cfg: &TableConfig,
    key: Uuid,
) -> Result<()> {
    let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("SELECT EXISTS (SELECT 1 FROM ");
    qb.push(&cfg.table)
        .push(" WHERE ")
        .push(&cfg.primary_key)
        .push(" = ")
        .push_bind(key)
        .push(")");

    let taken: bool = qb.build_query_scalar().fetch_one(&mut *conn).await?;
    if taken {
        return Err(ServiceError::Conflict(format!(
            "{}: {}={} already exists",
            cfg.table, cfg.primary_key, key
        )));
    }
    Ok(())
}

pub async fn check_unique_value_unused(
    conn: &mut PgConnection,
    cfg: &TableConfig,
    column: &str,
    value: &JsonValue,
) -> Result<()> {
    cfg.ensure_column(column)?;

    let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("SELECT EXISTS (SELECT 1 FROM ");
    qb.push(&cfg.table).push(" WHERE ").push(column).push(" = ");
    push_value(&mut qb, value);
    qb.push(")");

    let taken: bool = qb.build_query_scalar().fetch_one(&mut *conn).await?;
    if taken {
        return Err(ServiceError::Conflict(format!(
            "{}: {}={} already exists",
            cfg.table, column, value
        )));
    }
    Ok(())
}

/// Loads one row. With `for_update` the row stays locked until the surrounding
/// transaction ends.
pub async fn find_by_primary_key(
    conn: &mut PgConnection,
    cfg: &TableConfig,
    key: Uuid,
    for_update: bool,
) -> Result<JsonValue> {
    let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("");
    cfg.push_select(&mut qb);
    qb.push(" WHERE t.")
        .push(&cfg.primary_key)
        .push(" = ")
        .push_bind(key);
    if for_update {
        qb.push(" FOR UPDATE");
    }

    qb.build_query_scalar::<JsonValue>()
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| {
            ServiceError::NotFound(format!("{}: {}={}", cfg.table, cfg.primary_key, key))
        })
}

pub async fn find_all(conn: &mut PgConnection, cfg: &TableConfig) -> Result<Vec<JsonValue>> {
    let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("");
    cfg.push_select(&mut qb);
    qb.push(" ORDER BY t.").push(&cfg.primary_key).push(" ASC");

    let rows = qb
        .build_query_scalar::<JsonValue>()
        .fetch_all(&mut *conn)
        .await?;
    Ok(rows)
}

/// Inserts `data` under `key`. Keys of `data` that are not configured columns are ignored.
pub async fn insert_row(
    conn: &mut PgConnection,
    cfg: &TableConfig,
    key: Uuid,
    data: &Map<String, JsonValue>,
) -> Result<JsonValue> {
    let fields = cfg.writable(data);

    let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("INSERT INTO ");
    qb.push(&cfg.table).push(" AS t (").push(&cfg.primary_key);
    for (column, _) in &fields {
        qb.push(", ").push(*column);
    }
    qb.push(") VALUES (").push_bind(key);
    for (_, value) in &fields {
        qb.push(", ");
        push_value(&mut qb, value);
    }
    qb.push(") RETURNING row_to_json(t.*) AS record");

    let record = qb
        .build_query_scalar::<JsonValue>()
        .fetch_one(&mut *conn)
        .await?;
    Ok(record)
}

/// Applies `changes` to the row at `key`. With nothing writable in `changes` the
/// current row is returned and no statement is issued besides the read.
pub async fn update_row(
    conn: &mut PgConnection,
    cfg: &TableConfig,
    key: Uuid,
    changes: &Map<String, JsonValue>,
) -> Result<JsonValue> {
    let fields = cfg.writable(changes);
    if fields.is_empty() {
        return find_by_primary_key(conn, cfg, key, false).await;
    }

    let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE ");
    qb.push(&cfg.table).push(" AS t SET ");
    for (idx, (column, value)) in fields.iter().enumerate() {
        if idx > 0 {
            qb.push(", ");
        }
        qb.push(*column).push(" = ");
        push_value(&mut qb, value);
    }
    qb.push(" WHERE t.")
        .push(&cfg.primary_key)
        .push(" = ")
        .push_bind(key)
        .push(" RETURNING row_to_json(t.*) AS record");

    qb.build_query_scalar::<JsonValue>()
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| {
            ServiceError::NotFound(format!("{}: {}={}", cfg.table, cfg.primary_key, key))
        })
}

pub async fn delete_row(conn: &mut PgConnection, cfg: &TableConfig, key: Uuid) -> Result<()> {
    let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("DELETE FROM ");
    qb.push(&cfg.table)
        .push(" WHERE ")
        .push(&cfg.primary_key)
        .push(" = ")
        .push_bind(key);

    let done = qb.build().execute(&mut *conn).await?;
    if done.rows_affected() == 0 {
        return Err(ServiceError::NotFound(format!(
            "{}: {}={}",
            cfg.table, cfg.primary_key, key
        )));
    }
    Ok(())
}
