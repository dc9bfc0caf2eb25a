//! Application configuration module
//!
//! Values come from the process environment (plus a `.env` file during
//! development), read with the `config` and `dotenvy` crates. Keys carry the
//! `SEPAY_SUBSCRIPTIONS` prefix and nest with `__`:
//!
//! | Variable | Field |
//! |----------|-------|
//! | `SEPAY_SUBSCRIPTIONS__SERVER__PORT` | `server.port` |
//! | `SEPAY_SUBSCRIPTIONS__DATABASE__URL` | `database.url` |
//! | `SEPAY_SUBSCRIPTIONS__PAYMENT__SEPAY_API_KEY` | `payment.sepay_api_key` |
//! | `SEPAY_SUBSCRIPTIONS__PAYMENT__BANK_ACCOUNT` | `payment.bank_account` |
//!
//! ```no_run
//! use sepay_subscriptions::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod database;
mod error;
mod payment;
mod server;

pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use payment::PaymentConfig;
pub use server::{Environment, ServerConfig};

use serde::Deserialize;

const ENV_PREFIX: &str = "SEPAY_SUBSCRIPTIONS";

/// Root application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    pub database: DatabaseConfig,

    #[serde(default)]
    pub payment: PaymentConfig,
}

impl AppConfig {
    /// Reads the environment. Does not validate; call [`AppConfig::validate`].
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let source = config::Environment::default()
            .prefix(ENV_PREFIX)
            .separator("__");

        Ok(config::Config::builder()
            .add_source(source)
            .build()?
            .try_deserialize()?)
    }

    /// Checks every section. Payment rules tighten in production.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.database.validate()?;
        self.payment.validate(self.is_production())
    }

    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::env;
    use std::sync::Mutex;

    // Environment variables are process-global
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const BASE: [(&str, &str); 3] = [
        ("DATABASE__URL", "postgresql://test@localhost/test"),
        ("PAYMENT__BANK_ACCOUNT", "0123456789"),
        ("PAYMENT__BANK_NAME", "MBBank"),
    ];

    /// Loads with `BASE` plus `extra` set, then removes every variable again.
    fn load_with(extra: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let _guard = ENV_MUTEX.lock().unwrap();
        let vars: Vec<String> = BASE
            .iter()
            .chain(extra)
            .map(|(key, value)| {
                let name = format!("{}__{}", ENV_PREFIX, key);
                env::set_var(&name, value);
                name
            })
            .collect();

        let result = AppConfig::load();

        for name in vars {
            env::remove_var(name);
        }
        result
    }

    #[test]
    fn minimal_environment_loads_and_validates() {
        let config = load_with(&[]).expect("config should load");

        assert_eq!(config.database.url, "postgresql://test@localhost/test");
        assert_eq!(config.payment.bank_name, "MBBank");
        assert_eq!(config.payment.pending_window_secs, 60);
        assert_eq!(config.server.port, 8080);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn webhook_secret_is_read_as_secret() {
        let config = load_with(&[("PAYMENT__SEPAY_API_KEY", "sepay-key")]).unwrap();

        let key = config.payment.sepay_api_key.as_ref().unwrap();
        assert_eq!(key.expose_secret(), "sepay-key");
        assert!(!format!("{:?}", config).contains("sepay-key"));
    }

    #[test]
    fn production_without_secret_fails_validation() {
        let config = load_with(&[("SERVER__ENVIRONMENT", "production")]).unwrap();

        assert!(config.is_production());
        assert_eq!(config.validate(), Err(ValidationError::WebhookSecretRequired));
    }

    #[test]
    fn nested_overrides_apply() {
        let config = load_with(&[
            ("SERVER__PORT", "3000"),
            ("PAYMENT__PENDING_WINDOW_SECS", "120"),
        ])
        .unwrap();

        assert_eq!(config.server.port, 3000);
        assert_eq!(config.payment.pending_window_secs, 120);
    }
}
