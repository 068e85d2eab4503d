//! Centralized configuration (environment variables + defaults).
//!
//! Built once by the binary entry point and passed down; nothing reads the
//! environment after startup.

use crate::domain::LookupConfig;
use anyhow::Context;
use std::net::SocketAddr;

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// `DATABASE_URL` (required, no default for safety).
    pub database_url: String,
    /// `BIND_ADDR`, default `0.0.0.0:3000`.
    pub bind_addr: SocketAddr,
    /// `DB_MAX_CONNECTIONS`, default 5.
    pub max_connections: u32,
    pub lookup: LookupConfig,
}

impl AppConfig {
    /// Loads `.env` if present, then reads the process environment.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`AppConfig::from_env`] but reading through `get`.
    pub fn from_lookup<F>(get: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = get("DATABASE_URL").context("DATABASE_URL must be set")?;

        let bind_addr = get("BIND_ADDR")
            .unwrap_or_else(|| "0.0.0.0:3000".to_string())
            .parse::<SocketAddr>()
            .context("BIND_ADDR must be a socket address like 0.0.0.0:3000")?;

        let max_connections = match get("DB_MAX_CONNECTIONS") {
            Some(v) => v
                .parse::<u32>()
                .context("DB_MAX_CONNECTIONS must be a valid u32")?
                .max(1),
            None => 5,
        };

        let defaults = LookupConfig::default();
        let lookup = LookupConfig {
            table: get("LOOKUP_TABLE").unwrap_or(defaults.table),
            primary_key: get("LOOKUP_PRIMARY_KEY").unwrap_or(defaults.primary_key),
            allow_caller_primary_key: match get("LOOKUP_ALLOW_CALLER_KEY") {
                Some(v) => parse_flag(&v).context("LOOKUP_ALLOW_CALLER_KEY must be true or false")?,
                None => defaults.allow_caller_primary_key,
            },
        };

        Ok(Self {
            database_url,
            bind_addr,
            max_connections,
            lookup,
        })
    }
}

fn parse_flag(v: &str) -> Option<bool> {
    match v.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> anyhow::Result<AppConfig> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|name| map.get(name).cloned())
    }

    #[test]
    fn database_url_is_required() {
        assert!(load(&[]).is_err());
    }

    #[test]
    fn defaults_apply() {
        let cfg = load(&[("DATABASE_URL", "postgres://localhost/lookups")]).unwrap();
        assert_eq!(cfg.bind_addr.to_string(), "0.0.0.0:3000");
        assert_eq!(cfg.max_connections, 5);
        assert_eq!(cfg.lookup, LookupConfig::default());
    }

    #[test]
    fn overrides_apply() {
        let cfg = load(&[
            ("DATABASE_URL", "postgres://localhost/lookups"),
            ("BIND_ADDR", "127.0.0.1:8080"),
            ("DB_MAX_CONNECTIONS", "0"),
            ("LOOKUP_PRIMARY_KEY", "lookup_uuid"),
            ("LOOKUP_ALLOW_CALLER_KEY", "yes"),
        ])
        .unwrap();
        assert_eq!(cfg.bind_addr.port(), 8080);
        assert_eq!(cfg.max_connections, 1);
        assert_eq!(cfg.lookup.primary_key, "lookup_uuid");
        assert!(cfg.lookup.allow_caller_primary_key);
    }

    #[test]
    fn bad_flag_is_an_error() {
        assert!(load(&[
            ("DATABASE_URL", "postgres://localhost/lookups"),
            ("LOOKUP_ALLOW_CALLER_KEY", "maybe"),
        ])
        .is_err());
    }
}
