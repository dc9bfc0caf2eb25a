//! Subscription aggregate entity.
//!
//! A subscription starts as a `PENDING` order and is flipped to `ACTIVE` at
//! most once, by the webhook reconciler. The flip produces an [`Activation`]
//! that the store applies atomically together with the tier upgrade.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{StateMachine, SubscriptionId, Timestamp, UserId, ValidationError};

use super::{AccountTier, OrderId, PackageCode, SubscriptionError, SubscriptionStatus};

/// Subscription order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: SubscriptionId,
    pub order_id: OrderId,
    pub user_id: UserId,
    pub package: PackageCode,

    /// Amount in VND captured at creation. `None` on rows written before
    /// amounts were stored.
    pub amount: Option<i64>,

    pub status: SubscriptionStatus,
    pub start_date: Timestamp,
    pub expiry_date: Timestamp,
}

/// Everything the store needs to flip one order to `ACTIVE`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Activation {
    pub subscription_id: SubscriptionId,
    pub order_id: OrderId,
    pub user_id: UserId,
    pub tier: AccountTier,
    pub activated_at: Timestamp,
    pub expiry_date: Timestamp,
}

impl Subscription {
    /// Opens a pending order for a claimed amount.
    ///
    /// The claim must be positive and at least the package list price. The
    /// order expires after `pending_window_secs` unless a transfer arrives.
    pub fn open_pending(
        order_id: OrderId,
        user_id: UserId,
        package: PackageCode,
        amount: i64,
        now: Timestamp,
        pending_window_secs: u64,
    ) -> Result<Self, SubscriptionError> {
        if amount <= 0 {
            return Err(SubscriptionError::invalid_request(
                "amount",
                "Amount must be a positive number",
            ));
        }
        if amount < package.price() {
            return Err(SubscriptionError::invalid_request(
                "amount",
                format!(
                    "Amount {} is below the {} price of {}",
                    amount,
                    package,
                    package.price()
                ),
            ));
        }

        Ok(Self {
            id: SubscriptionId::new(),
            order_id,
            user_id,
            package,
            amount: Some(amount),
            status: SubscriptionStatus::Pending,
            start_date: now,
            expiry_date: now.plus_secs(pending_window_secs),
        })
    }

    /// Amount a transfer must reach: the stored amount, or the live package
    /// price when nothing (or zero) was stored.
    pub fn expected_amount(&self) -> i64 {
        self.amount
            .filter(|a| *a > 0)
            .unwrap_or_else(|| self.package.price())
    }

    /// True if `transferred` pays for this order.
    pub fn covers(&self, transferred: i64) -> bool {
        transferred >= self.expected_amount()
    }

    pub fn is_pending(&self) -> bool {
        self.status.is_pending()
    }

    /// Transitions to `ACTIVE` and returns the activation to persist.
    ///
    /// The entitlement period runs from `at` for the package's months.
    pub fn activate(&mut self, at: Timestamp) -> Result<Activation, ValidationError> {
        self.status = self.status.transition_to(SubscriptionStatus::Active)?;
        self.expiry_date = self.package.expiry_from(at);

        Ok(Activation {
            subscription_id: self.id,
            order_id: self.order_id.clone(),
            user_id: self.user_id.clone(),
            tier: AccountTier::Premium,
            activated_at: at,
            expiry_date: self.expiry_date,
        })
    }
}
