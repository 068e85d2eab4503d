//! DDL for the registry table and the per-type values tables.
//!
//! All names pass through [`validate_identifier`] before they are formatted in.

use crate::domain::ident::validate_identifier;
use crate::error::Result;
use crate::storage::rows::TableConfig;
use uuid::Uuid;

pub const VALUES_TABLE_SUFFIX: &str = "_lookup_values";

/// `<lookup_type>_lookup_values`, checked as a whole so the suffix cannot push it
/// past the identifier length limit.
pub fn values_table_name(lookup_type: &str) -> Result<String> {
    validate_identifier(lookup_type)?;
    let name = format!("{}{}", lookup_type, VALUES_TABLE_SUFFIX);
    validate_identifier(&name)?;
    Ok(name)
}

pub fn create_values_table_sql(lookup_type: &str, key: Uuid) -> Result<String> {
    let table = values_table_name(lookup_type)?;
    Ok(format!(
        "CREATE TABLE {table} (\
         lookup_code varchar(30) NOT NULL, \
         meaning varchar(30) NOT NULL, \
         description text, \
         is_enabled boolean NOT NULL DEFAULT false, \
         CONSTRAINT \"{key}_pk\" PRIMARY KEY (lookup_code), \
         CONSTRAINT \"{key}_uk\" UNIQUE (meaning)\
         )"
    ))
}

pub fn rename_values_table_sql(old_type: &str, new_type: &str) -> Result<String> {
    let old = values_table_name(old_type)?;
    let new = values_table_name(new_type)?;
    Ok(format!("ALTER TABLE {old} RENAME TO {new}"))
}

pub fn drop_values_table_sql(lookup_type: &str) -> Result<String> {
    let table = values_table_name(lookup_type)?;
    Ok(format!("DROP TABLE {table}"))
}

/// Idempotent bootstrap of the registry table itself.
pub fn registry_table_sql(cfg: &TableConfig) -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS {} (\
         {} uuid PRIMARY KEY, \
         lookup_type text NOT NULL UNIQUE, \
         meaning text NOT NULL UNIQUE, \
         description text\
         )",
        cfg.table(),
        cfg.primary_key()
    )
}
