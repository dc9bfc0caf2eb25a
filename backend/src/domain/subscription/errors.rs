//! Subscription-specific error types.
//!
//! Reconciliation no-ops (no correlation token, no pending order,
//! insufficient amount) are outcomes, not errors, and do not appear here.
//!
//! # HTTP Status Mapping
//!
//! | Error | HTTP Status |
//! |-------|-------------|
//! | InvalidRequest | 400 |
//! | Unauthorized | 401 |
//! | Persistence | 500 |

use crate::domain::foundation::{DomainError, ErrorCode, ValidationError};

/// Why a webhook credential was rejected. Logged, never returned to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnauthorizedReason {
    /// No webhook secret is configured on this deployment.
    SecretNotConfigured,

    /// Request carried no `Authorization` header.
    MissingCredential,

    /// Header present but does not contain the secret.
    CredentialMismatch,
}

impl UnauthorizedReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnauthorizedReason::SecretNotConfigured => "secret_not_configured",
            UnauthorizedReason::MissingCredential => "missing_credential",
            UnauthorizedReason::CredentialMismatch => "credential_mismatch",
        }
    }
}

/// Subscription errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubscriptionError {
    /// Request is malformed or violates pricing rules.
    InvalidRequest { field: String, message: String },

    /// Webhook credential check failed.
    Unauthorized(UnauthorizedReason),

    /// Order store or entitlement store failed.
    Persistence(String),
}

impl SubscriptionError {
    pub fn invalid_request(field: impl Into<String>, message: impl Into<String>) -> Self {
        SubscriptionError::InvalidRequest {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn unauthorized(reason: UnauthorizedReason) -> Self {
        SubscriptionError::Unauthorized(reason)
    }

    pub fn persistence(message: impl Into<String>) -> Self {
        SubscriptionError::Persistence(message.into())
    }

    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            SubscriptionError::InvalidRequest { .. } => ErrorCode::InvalidRequest,
            SubscriptionError::Unauthorized(_) => ErrorCode::Unauthorized,
            SubscriptionError::Persistence(_) => ErrorCode::DatabaseError,
        }
    }

    /// Returns a caller-facing message.
    ///
    /// Unauthorized collapses to one message so callers cannot probe which
    /// check failed.
    pub fn message(&self) -> String {
        match self {
            SubscriptionError::InvalidRequest { message, .. } => message.clone(),
            SubscriptionError::Unauthorized(_) => "Unauthorized".to_string(),
            SubscriptionError::Persistence(_) => "Internal server error".to_string(),
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, SubscriptionError::Persistence(_))
    }
}

impl std::fmt::Display for SubscriptionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubscriptionError::InvalidRequest { field, message } => {
                write!(f, "Invalid request ({}): {}", field, message)
            }
            SubscriptionError::Unauthorized(reason) => write!(f, "Unauthorized: {}", reason.as_str()),
            SubscriptionError::Persistence(msg) => write!(f, "Persistence failure: {}", msg),
        }
    }
}

impl std::error::Error for SubscriptionError {}

impl From<DomainError> for SubscriptionError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::ValidationFailed | ErrorCode::InvalidRequest => {
                let field = err
                    .details
                    .get("field")
                    .cloned()
                    .unwrap_or_else(|| "request".to_string());
                SubscriptionError::invalid_request(field, err.message)
            }
            ErrorCode::Unauthorized => {
                SubscriptionError::unauthorized(UnauthorizedReason::CredentialMismatch)
            }
            _ => SubscriptionError::persistence(err.to_string()),
        }
    }
}

impl From<ValidationError> for SubscriptionError {
    fn from(err: ValidationError) -> Self {
        SubscriptionError::invalid_request(err.field().to_string(), err.to_string())
    }
}
