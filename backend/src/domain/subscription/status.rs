//! Subscription status state machine.
//!
//! `PENDING` is the only state with outgoing transitions. `ACTIVE` is driven by
//! the webhook reconciler; `EXPIRED` and `CANCELLED` are written by external
//! processes (expiry sweep, manual cancellation).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{StateMachine, ValidationError};

/// Status of a subscription order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubscriptionStatus {
    /// Order opened, waiting for the bank transfer to land.
    Pending,

    /// Payment matched; entitlement granted until `expiry_date`.
    Active,

    /// Pending order went stale, or an active period ran out.
    Expired,

    /// Order cancelled before payment.
    Cancelled,
}

impl SubscriptionStatus {
    /// Storage code (`PENDING`, `ACTIVE`, ...).
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionStatus::Pending => "PENDING",
            SubscriptionStatus::Active => "ACTIVE",
            SubscriptionStatus::Expired => "EXPIRED",
            SubscriptionStatus::Cancelled => "CANCELLED",
        }
    }

    /// Label shown to the account holder in payment history.
    pub fn display_label(&self) -> &'static str {
        match self {
            SubscriptionStatus::Pending => "Đang xử lý",
            SubscriptionStatus::Active => "Thành công",
            SubscriptionStatus::Cancelled => "Thanh toán thất bại",
            SubscriptionStatus::Expired => "Đã hết hạn",
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, SubscriptionStatus::Pending)
    }
}

impl StateMachine for SubscriptionStatus {
    fn valid_transitions(&self) -> Vec<Self> {
        use SubscriptionStatus::*;
        match self {
            Pending => vec![Active, Expired, Cancelled],
            Active | Expired | Cancelled => vec![],
        }
    }
}

impl fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubscriptionStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(SubscriptionStatus::Pending),
            "ACTIVE" => Ok(SubscriptionStatus::Active),
            "EXPIRED" => Ok(SubscriptionStatus::Expired),
            "CANCELLED" => Ok(SubscriptionStatus::Cancelled),
            other => Err(ValidationError::invalid_format(
                "status",
                format!("Unknown subscription status '{}'", other),
            )),
        }
    }
}
