//! Database configuration

use serde::Deserialize;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

use super::error::ValidationError;

const MAX_POOL_SIZE: u32 = 100;

/// PostgreSQL pool settings. Only `url` has no default.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    pub min_connections: u32,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
    pub idle_timeout_secs: u64,

    /// Run `migrations/` before serving
    pub run_migrations: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            min_connections: 1,
            max_connections: 10,
            acquire_timeout_secs: 5,
            idle_timeout_secs: 600,
            run_migrations: false,
        }
    }
}

impl DatabaseConfig {
    pub fn pool_options(&self) -> PgPoolOptions {
        PgPoolOptions::new()
            .min_connections(self.min_connections)
            .max_connections(self.max_connections)
            .acquire_timeout(Duration::from_secs(self.acquire_timeout_secs))
            .idle_timeout(Duration::from_secs(self.idle_timeout_secs))
    }

    /// Opens the pool and waits for the first connection.
    pub async fn connect(&self) -> Result<PgPool, sqlx::Error> {
        self.pool_options().connect(&self.url).await
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.url.trim().is_empty() {
            return Err(ValidationError::Missing {
                key: "DATABASE__URL",
            });
        }
        let scheme_ok = ["postgres://", "postgresql://"]
            .iter()
            .any(|scheme| self.url.starts_with(scheme));
        if !scheme_ok {
            return Err(ValidationError::DatabaseScheme);
        }
        ValidationError::ensure_range(
            "DATABASE__MAX_CONNECTIONS",
            u64::from(self.max_connections),
            1,
            u64::from(MAX_POOL_SIZE),
        )?;
        if self.min_connections > self.max_connections {
            return Err(ValidationError::PoolInverted {
                min: self.min_connections,
                max: self.max_connections,
            });
        }
        ValidationError::ensure_range(
            "DATABASE__ACQUIRE_TIMEOUT_SECS",
            self.acquire_timeout_secs,
            1,
            300,
        )
    }
}
