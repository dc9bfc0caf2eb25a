//! In-memory subscription store for testing.
//!
//! Implements both subscription ports plus the account tier table behind a
//! single lock, so activation is atomic exactly as the Postgres transaction
//! is. Accounts must be registered before they can be activated, matching
//! the external `users` table.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;

use crate::domain::foundation::{DomainError, ErrorCode, UserId};
use crate::domain::subscription::{
    AccountTier, Activation, OrderId, Subscription, SubscriptionStatus,
};
use crate::ports::{
    ActivationResult, InsertResult, PaymentHistoryEntry, SubscriptionReader,
    SubscriptionRepository,
};

#[derive(Default)]
struct State {
    subscriptions: Vec<Subscription>,
    tiers: HashMap<UserId, AccountTier>,
}

/// In-memory order and tier store.
///
/// # Example
///
/// ```ignore
/// let store = Arc::new(InMemorySubscriptionStore::new());
/// store.register_account(user_id.clone()).await;
///
/// // ... run the webhook handler ...
///
/// assert_eq!(store.tier_of(&user_id).await, Some(AccountTier::Premium));
/// ```
#[derive(Default)]
pub struct InMemorySubscriptionStore {
    state: Mutex<State>,
}

impl InMemorySubscriptionStore {
    pub fn new() -> Self {
        Self::default()
    }

    // === Test Helpers ===

    /// Adds an account on the free tier. Existing accounts are left as is.
    pub async fn register_account(&self, user_id: UserId) {
        self.state
            .lock()
            .await
            .tiers
            .entry(user_id)
            .or_insert(AccountTier::Free);
    }

    pub async fn tier_of(&self, user_id: &UserId) -> Option<AccountTier> {
        self.state.lock().await.tiers.get(user_id).copied()
    }

    pub async fn find_by_order_id(&self, order_id: &OrderId) -> Option<Subscription> {
        self.state
            .lock()
            .await
            .subscriptions
            .iter()
            .find(|s| &s.order_id == order_id)
            .cloned()
    }

    /// Overwrites an order's status, standing in for the external expiry
    /// sweep or a manual cancellation.
    pub async fn set_status(&self, order_id: &OrderId, status: SubscriptionStatus) -> bool {
        let mut state = self.state.lock().await;
        match state.subscriptions.iter_mut().find(|s| &s.order_id == order_id) {
            Some(sub) => {
                sub.status = status;
                true
            }
            None => false,
        }
    }

    pub async fn subscription_count(&self) -> usize {
        self.state.lock().await.subscriptions.len()
    }
}

#[async_trait]
impl SubscriptionRepository for InMemorySubscriptionStore {
    async fn insert(&self, subscription: &Subscription) -> Result<InsertResult, DomainError> {
        let mut state = self.state.lock().await;
        if state
            .subscriptions
            .iter()
            .any(|s| s.order_id == subscription.order_id)
        {
            return Ok(InsertResult::DuplicateOrderId);
        }
        state.subscriptions.push(subscription.clone());
        Ok(InsertResult::Inserted)
    }

    async fn find_pending_by_order_id(
        &self,
        order_id: &OrderId,
    ) -> Result<Option<Subscription>, DomainError> {
        let state = self.state.lock().await;
        Ok(state
            .subscriptions
            .iter()
            .find(|s| &s.order_id == order_id && s.is_pending())
            .cloned())
    }

    async fn activate(&self, activation: &Activation) -> Result<ActivationResult, DomainError> {
        let mut state = self.state.lock().await;
        let State {
            subscriptions,
            tiers,
        } = &mut *state;

        let Some(sub) = subscriptions
            .iter_mut()
            .find(|s| s.order_id == activation.order_id && s.is_pending())
        else {
            return Ok(ActivationResult::NotPending);
        };

        // Both writes happen under the same guard, or neither does.
        let Some(tier) = tiers.get_mut(&activation.user_id) else {
            return Err(DomainError::new(
                ErrorCode::AccountNotFound,
                format!("Account not found: {}", activation.user_id),
            ));
        };

        sub.status = SubscriptionStatus::Active;
        sub.expiry_date = activation.expiry_date;
        *tier = activation.tier;

        Ok(ActivationResult::Activated)
    }
}

#[async_trait]
impl SubscriptionReader for InMemorySubscriptionStore {
    async fn list_history(&self, user_id: &UserId) -> Result<Vec<PaymentHistoryEntry>, DomainError> {
        let state = self.state.lock().await;
        let mut history: Vec<PaymentHistoryEntry> = state
            .subscriptions
            .iter()
            .filter(|s| &s.user_id == user_id)
            .map(|s| PaymentHistoryEntry {
                id: s.id,
                order_id: s.order_id.clone(),
                package: s.package.as_str().to_string(),
                amount: s.amount,
                status: s.status,
                start_date: s.start_date,
                expiry_date: s.expiry_date,
            })
            .collect();
        history.sort_by(|a, b| b.start_date.cmp(&a.start_date));
        Ok(history)
    }
}
