//! Account entitlement tiers.
//!
//! The tier lives on the external account record; this crate only ever
//! upgrades it to `Premium` as part of an activation.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::domain::foundation::ValidationError;

/// Entitlement level of an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AccountTier {
    /// Default tier for accounts without a paid subscription.
    Free,

    /// Granted by any activated package.
    Premium,
}

impl AccountTier {
    /// Storage code (`FREE`, `PREMIUM`).
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountTier::Free => "FREE",
            AccountTier::Premium => "PREMIUM",
        }
    }

    pub fn is_premium(&self) -> bool {
        matches!(self, AccountTier::Premium)
    }
}

impl std::fmt::Display for AccountTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccountTier {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "FREE" => Ok(AccountTier::Free),
            "PREMIUM" => Ok(AccountTier::Premium),
            other => Err(ValidationError::invalid_format(
                "tier",
                format!("Unknown tier '{}'", other),
            )),
        }
    }
}
