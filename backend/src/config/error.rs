//! Configuration error types

use thiserror::Error;

/// Startup failure while building [`super::AppConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    Invalid(#[from] ValidationError),
}

/// A loaded value that the server refuses to start with.
///
/// `key` is the variable path below the `SEPAY_SUBSCRIPTIONS__` prefix.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{key} is required")]
    Missing { key: &'static str },

    #[error("{key} = {value} is outside {min}..={max}")]
    OutOfRange {
        key: &'static str,
        value: u64,
        min: u64,
        max: u64,
    },

    #[error("cannot bind to {0}")]
    ListenAddress(String),

    #[error("DATABASE__URL must use the postgres:// or postgresql:// scheme")]
    DatabaseScheme,

    #[error("DATABASE__MIN_CONNECTIONS ({min}) exceeds DATABASE__MAX_CONNECTIONS ({max})")]
    PoolInverted { min: u32, max: u32 },

    #[error("PAYMENT__SEPAY_API_KEY is required in production")]
    WebhookSecretRequired,
}

impl ValidationError {
    /// Checks `min <= value <= max`.
    pub(super) fn ensure_range(
        key: &'static str,
        value: u64,
        min: u64,
        max: u64,
    ) -> Result<(), Self> {
        if (min..=max).contains(&value) {
            Ok(())
        } else {
            Err(ValidationError::OutOfRange {
                key,
                value,
                min,
                max,
            })
        }
    }
}
