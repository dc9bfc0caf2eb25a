//! Subscription reader port (read side / CQRS queries).
//!
//! History rows are read raw: the package code is kept as stored so rows
//! with a retired or unknown package still display.

use crate::domain::foundation::{DomainError, SubscriptionId, Timestamp, UserId};
use crate::domain::subscription::{price_of, OrderId, SubscriptionStatus};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Reader port for an account's payment history.
#[async_trait]
pub trait SubscriptionReader: Send + Sync {
    /// All orders for the account, newest `start_date` first.
    async fn list_history(&self, user_id: &UserId) -> Result<Vec<PaymentHistoryEntry>, DomainError>;
}

/// One order as shown in payment history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentHistoryEntry {
    pub id: SubscriptionId,
    pub order_id: OrderId,
    pub package: String,
    pub amount: Option<i64>,
    pub status: SubscriptionStatus,
    pub start_date: Timestamp,
    pub expiry_date: Timestamp,
}

impl PaymentHistoryEntry {
    /// Amount to display: stored amount, else the live package price.
    pub fn display_amount(&self) -> i64 {
        self.amount
            .filter(|a| *a > 0)
            .unwrap_or_else(|| price_of(&self.package))
    }
}
