//! Shared-secret authentication for transfer notifications.
//!
//! The gateway sends `Authorization: Apikey <secret>`. A notification is
//! authentic when the presented header contains the configured secret.
//! The comparison runs over every window of the header so the time taken
//! does not depend on where (or whether) the secret matches.

use secrecy::{ExposeSecret, SecretString};
use subtle::{Choice, ConstantTimeEq};

use super::errors::{SubscriptionError, UnauthorizedReason};

/// Verifies the credential presented with a transfer notification.
#[derive(Clone)]
pub struct TransferWebhookVerifier {
    secret: Option<SecretString>,
}

impl TransferWebhookVerifier {
    /// Creates a verifier. `None` (or an empty secret) rejects every request.
    pub fn new(secret: Option<SecretString>) -> Self {
        let secret = secret.filter(|s| !s.expose_secret().is_empty());
        Self { secret }
    }

    pub fn is_configured(&self) -> bool {
        self.secret.is_some()
    }

    /// Checks the raw `Authorization` header value.
    pub fn verify(&self, credential: Option<&str>) -> Result<(), SubscriptionError> {
        let secret = self
            .secret
            .as_ref()
            .ok_or_else(|| SubscriptionError::unauthorized(UnauthorizedReason::SecretNotConfigured))?;

        let credential = credential
            .filter(|c| !c.is_empty())
            .ok_or_else(|| SubscriptionError::unauthorized(UnauthorizedReason::MissingCredential))?;

        if constant_time_contains(credential.as_bytes(), secret.expose_secret().as_bytes()) {
            Ok(())
        } else {
            Err(SubscriptionError::unauthorized(UnauthorizedReason::CredentialMismatch))
        }
    }
}

impl std::fmt::Debug for TransferWebhookVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransferWebhookVerifier")
            .field("configured", &self.is_configured())
            .finish()
    }
}

/// Returns true if `needle` occurs anywhere in `haystack`.
fn constant_time_contains(haystack: &[u8], needle: &[u8]) -> bool {
    if needle.is_empty() || needle.len() > haystack.len() {
        return false;
    }
    let mut found = Choice::from(0u8);
    for window in haystack.windows(needle.len()) {
        found |= window.ct_eq(needle);
    }
    found.into()
}
