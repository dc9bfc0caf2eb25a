//! Payment configuration (SePay bank transfer)

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::application::TransferCheckoutSettings;
use crate::domain::subscription::TransferWebhookVerifier;

use super::error::ValidationError;

/// Payment configuration.
///
/// Loaded once at startup and passed by value to the handlers; nothing here
/// is re-read per request.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentConfig {
    /// Shared secret the gateway presents as `Authorization: Apikey <key>`
    #[serde(default)]
    pub sepay_api_key: Option<SecretString>,

    /// Receiving bank account number shown to payers
    #[serde(default)]
    pub bank_account: String,

    /// Receiving bank name shown to payers
    #[serde(default)]
    pub bank_name: String,

    /// How long a pending order stays open, in seconds
    #[serde(default = "default_pending_window")]
    pub pending_window_secs: u64,
}

impl PaymentConfig {
    /// True when a non-empty webhook secret is configured.
    pub fn has_webhook_secret(&self) -> bool {
        self.sepay_api_key
            .as_ref()
            .is_some_and(|k| !k.expose_secret().is_empty())
    }

    pub fn webhook_verifier(&self) -> TransferWebhookVerifier {
        TransferWebhookVerifier::new(self.sepay_api_key.clone())
    }

    pub fn checkout_settings(&self) -> TransferCheckoutSettings {
        TransferCheckoutSettings {
            bank_account: self.bank_account.clone(),
            bank_name: self.bank_name.clone(),
            pending_window_secs: self.pending_window_secs,
        }
    }

    /// Validate payment configuration.
    ///
    /// Outside production a missing webhook secret is allowed; the server
    /// starts but rejects every webhook.
    pub fn validate(&self, is_production: bool) -> Result<(), ValidationError> {
        if self.bank_account.trim().is_empty() {
            return Err(ValidationError::Missing {
                key: "PAYMENT__BANK_ACCOUNT",
            });
        }
        if self.bank_name.trim().is_empty() {
            return Err(ValidationError::Missing {
                key: "PAYMENT__BANK_NAME",
            });
        }
        if is_production && !self.has_webhook_secret() {
            return Err(ValidationError::WebhookSecretRequired);
        }
        ValidationError::ensure_range(
            "PAYMENT__PENDING_WINDOW_SECS",
            self.pending_window_secs,
            1,
            86_400,
        )
    }
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            sepay_api_key: None,
            bank_account: String::new(),
            bank_name: String::new(),
            pending_window_secs: default_pending_window(),
        }
    }
}

fn default_pending_window() -> u64 {
    60
}
