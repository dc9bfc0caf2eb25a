//! Subscription repository port (write side).
//!
//! # Design
//!
//! - **Unique order ids**: inserts report collisions instead of failing, so
//!   the caller can regenerate and retry
//! - **Atomic activation**: the status compare-and-swap and the tier upgrade
//!   commit together or not at all
//!
//! # Example
//!
//! ```ignore
//! match repo.activate(&activation).await? {
//!     ActivationResult::Activated => info!("granted premium"),
//!     ActivationResult::NotPending => info!("lost the race or already resolved"),
//! }
//! ```

use crate::domain::foundation::DomainError;
use crate::domain::subscription::{Activation, OrderId, Subscription};
use async_trait::async_trait;

/// Result of inserting a new order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertResult {
    /// Row written.
    Inserted,
    /// Another order already holds this order id.
    DuplicateOrderId,
}

/// Result of an activation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationResult {
    /// Order flipped to `ACTIVE` and the account upgraded.
    Activated,
    /// Order was no longer `PENDING` when the update ran. Nothing changed.
    NotPending,
}

/// Repository port for subscription orders.
#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    /// Insert a new `PENDING` order.
    ///
    /// # Errors
    ///
    /// - `DatabaseError` on persistence failure
    async fn insert(&self, subscription: &Subscription) -> Result<InsertResult, DomainError>;

    /// Find the order with this order id, only if it is still `PENDING`.
    async fn find_pending_by_order_id(
        &self,
        order_id: &OrderId,
    ) -> Result<Option<Subscription>, DomainError>;

    /// Flip the order to `ACTIVE` and upgrade the account tier in one unit.
    ///
    /// The status update must be conditional on `status = 'PENDING'`. If the
    /// tier update fails, the status update is rolled back.
    ///
    /// # Errors
    ///
    /// - `AccountNotFound` if the account row is missing (nothing committed)
    /// - `DatabaseError` on persistence failure (nothing committed)
    async fn activate(&self, activation: &Activation) -> Result<ActivationResult, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subscription_repository_is_object_safe() {
        fn _accepts_dyn(_repo: &dyn SubscriptionRepository) {}
    }
}
