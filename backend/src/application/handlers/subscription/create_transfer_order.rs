//! CreateTransferOrderHandler - Command handler for opening a bank-transfer order.

use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::foundation::{Timestamp, UserId};
use crate::domain::subscription::{
    OrderId, OrderIdGenerator, PackageCode, Subscription, SubscriptionError,
};
use crate::ports::{InsertResult, SubscriptionRepository};

/// Attempts before giving up on order id collisions.
const MAX_INSERT_ATTEMPTS: usize = 5;

/// Command to open a pending transfer order.
#[derive(Debug, Clone)]
pub struct CreateTransferOrderCommand {
    pub user_id: UserId,
    pub package_details: Option<String>,
    pub amount: Option<i64>,
}

/// Payment instructions returned to the payer.
#[derive(Debug, Clone)]
pub struct CreateTransferOrderResult {
    pub order_id: OrderId,
    pub amount: i64,
    pub bank_account: String,
    pub bank_name: String,
}

/// Deployment settings the handler needs.
#[derive(Debug, Clone)]
pub struct TransferCheckoutSettings {
    pub bank_account: String,
    pub bank_name: String,
    pub pending_window_secs: u64,
}

/// Handler for opening transfer orders.
///
/// Opens a `PENDING` order and returns the bank details plus the order id
/// the payer must put in the transfer memo. Activation happens later, when
/// the gateway webhook reports the transfer.
pub struct CreateTransferOrderHandler {
    repository: Arc<dyn SubscriptionRepository>,
    order_ids: Arc<OrderIdGenerator>,
    settings: TransferCheckoutSettings,
}

impl CreateTransferOrderHandler {
    pub fn new(
        repository: Arc<dyn SubscriptionRepository>,
        order_ids: Arc<OrderIdGenerator>,
        settings: TransferCheckoutSettings,
    ) -> Self {
        Self {
            repository,
            order_ids,
            settings,
        }
    }

    pub async fn handle(
        &self,
        cmd: CreateTransferOrderCommand,
    ) -> Result<CreateTransferOrderResult, SubscriptionError> {
        // 1. Both fields are required
        let (raw_package, amount) = match (cmd.package_details, cmd.amount) {
            (Some(p), Some(a)) if !p.trim().is_empty() => (p, a),
            _ => {
                return Err(SubscriptionError::invalid_request(
                    "package_details",
                    "Thiếu thông tin gói hoặc số tiền",
                ))
            }
        };

        // 2. Closed package set
        let package: PackageCode = raw_package.parse()?;

        // 3. Insert, regenerating the order id on collision
        for attempt in 1..=MAX_INSERT_ATTEMPTS {
            let subscription = Subscription::open_pending(
                self.order_ids.next(),
                cmd.user_id.clone(),
                package,
                amount,
                Timestamp::now(),
                self.settings.pending_window_secs,
            )?;

            match self.repository.insert(&subscription).await? {
                InsertResult::Inserted => {
                    info!(
                        order_id = %subscription.order_id,
                        user_id = %subscription.user_id,
                        package = %package,
                        amount,
                        "Opened pending transfer order"
                    );
                    return Ok(CreateTransferOrderResult {
                        order_id: subscription.order_id,
                        amount,
                        bank_account: self.settings.bank_account.clone(),
                        bank_name: self.settings.bank_name.clone(),
                    });
                }
                InsertResult::DuplicateOrderId => {
                    warn!(
                        order_id = %subscription.order_id,
                        attempt,
                        "Order id collision, regenerating"
                    );
                }
            }
        }

        Err(SubscriptionError::persistence(format!(
            "Could not allocate a unique order id after {} attempts",
            MAX_INSERT_ATTEMPTS
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{DomainError, ErrorCode};
    use crate::domain::subscription::{Activation, SubscriptionStatus};
    use crate::ports::ActivationResult;
    use async_trait::async_trait;
    use std::sync::Mutex;

    // ════════════════════════════════════════════════════════════════════════════
    // Mock Implementations
    // ════════════════════════════════════════════════════════════════════════════

    struct MockSubscriptionRepository {
        inserted: Mutex<Vec<Subscription>>,
        collisions_left: Mutex<usize>,
        fail_insert: bool,
    }

    impl MockSubscriptionRepository {
        fn new() -> Self {
            Self {
                inserted: Mutex::new(Vec::new()),
                collisions_left: Mutex::new(0),
                fail_insert: false,
            }
        }

        fn colliding(times: usize) -> Self {
            let repo = Self::new();
            *repo.collisions_left.lock().unwrap() = times;
            repo
        }

        fn failing() -> Self {
            Self {
                fail_insert: true,
                ..Self::new()
            }
        }

        fn inserted(&self) -> Vec<Subscription> {
            self.inserted.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl SubscriptionRepository for MockSubscriptionRepository {
        async fn insert(&self, subscription: &Subscription) -> Result<InsertResult, DomainError> {
            if self.fail_insert {
                return Err(DomainError::new(
                    ErrorCode::DatabaseError,
                    "Simulated insert failure",
                ));
            }
            let mut collisions = self.collisions_left.lock().unwrap();
            if *collisions > 0 {
                *collisions -= 1;
                return Ok(InsertResult::DuplicateOrderId);
            }
            self.inserted.lock().unwrap().push(subscription.clone());
            Ok(InsertResult::Inserted)
        }

        async fn find_pending_by_order_id(
            &self,
            _order_id: &OrderId,
        ) -> Result<Option<Subscription>, DomainError> {
            Ok(None)
        }

        async fn activate(&self, _activation: &Activation) -> Result<ActivationResult, DomainError> {
            Ok(ActivationResult::NotPending)
        }
    }

    fn settings() -> TransferCheckoutSettings {
        TransferCheckoutSettings {
            bank_account: "0123456789".to_string(),
            bank_name: "MBBank".to_string(),
            pending_window_secs: 60,
        }
    }

    fn handler(repo: Arc<MockSubscriptionRepository>) -> CreateTransferOrderHandler {
        CreateTransferOrderHandler::new(repo, Arc::new(OrderIdGenerator::new()), settings())
    }

    fn command(package: Option<&str>, amount: Option<i64>) -> CreateTransferOrderCommand {
        CreateTransferOrderCommand {
            user_id: UserId::new("user-1").unwrap(),
            package_details: package.map(String::from),
            amount,
        }
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Success Cases
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn opens_pending_order_with_bank_details() {
        let repo = Arc::new(MockSubscriptionRepository::new());
        let result = handler(repo.clone())
            .handle(command(Some("3_THANG"), Some(99_000)))
            .await
            .unwrap();

        assert!(result.order_id.as_str().starts_with("DH"));
        assert_eq!(result.amount, 99_000);
        assert_eq!(result.bank_account, "0123456789");
        assert_eq!(result.bank_name, "MBBank");

        let inserted = repo.inserted();
        assert_eq!(inserted.len(), 1);
        assert_eq!(inserted[0].status, SubscriptionStatus::Pending);
        assert_eq!(inserted[0].package, PackageCode::ThreeMonths);
        assert_eq!(inserted[0].amount, Some(99_000));
        assert_eq!(inserted[0].order_id, result.order_id);
    }

    #[tokio::test]
    async fn pending_order_expires_after_grace_window() {
        let repo = Arc::new(MockSubscriptionRepository::new());
        handler(repo.clone())
            .handle(command(Some("6_THANG"), Some(179_000)))
            .await
            .unwrap();

        let sub = &repo.inserted()[0];
        assert_eq!(
            sub.expiry_date.as_unix_millis() - sub.start_date.as_unix_millis(),
            60_000
        );
    }

    #[tokio::test]
    async fn retries_on_order_id_collision() {
        let repo = Arc::new(MockSubscriptionRepository::colliding(2));
        let result = handler(repo.clone())
            .handle(command(Some("12_THANG"), Some(299_000)))
            .await;

        assert!(result.is_ok());
        assert_eq!(repo.inserted().len(), 1);
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Validation Errors
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn missing_package_is_invalid() {
        let repo = Arc::new(MockSubscriptionRepository::new());
        let result = handler(repo.clone()).handle(command(None, Some(99_000))).await;

        assert!(matches!(result, Err(SubscriptionError::InvalidRequest { .. })));
        assert!(repo.inserted().is_empty());
    }

    #[tokio::test]
    async fn missing_amount_is_invalid() {
        let repo = Arc::new(MockSubscriptionRepository::new());
        let result = handler(repo).handle(command(Some("3_THANG"), None)).await;
        assert!(matches!(result, Err(SubscriptionError::InvalidRequest { .. })));
    }

    #[tokio::test]
    async fn unknown_package_is_invalid() {
        let repo = Arc::new(MockSubscriptionRepository::new());
        let result = handler(repo.clone())
            .handle(command(Some("1_THANG"), Some(99_000)))
            .await;

        match result {
            Err(SubscriptionError::InvalidRequest { field, .. }) => {
                assert_eq!(field, "package_details")
            }
            other => panic!("Expected InvalidRequest, got {:?}", other),
        }
        assert!(repo.inserted().is_empty());
    }

    #[tokio::test]
    async fn amount_below_price_is_invalid() {
        let repo = Arc::new(MockSubscriptionRepository::new());
        let result = handler(repo.clone())
            .handle(command(Some("12_THANG"), Some(99_000)))
            .await;

        assert!(matches!(result, Err(SubscriptionError::InvalidRequest { .. })));
        assert!(repo.inserted().is_empty());
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Infrastructure Errors
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn store_failure_is_persistence_error() {
        let repo = Arc::new(MockSubscriptionRepository::failing());
        let result = handler(repo).handle(command(Some("3_THANG"), Some(99_000))).await;
        assert!(matches!(result, Err(SubscriptionError::Persistence(_))));
    }

    #[tokio::test]
    async fn persistent_collisions_give_up() {
        let repo = Arc::new(MockSubscriptionRepository::colliding(MAX_INSERT_ATTEMPTS));
        let result = handler(repo.clone())
            .handle(command(Some("3_THANG"), Some(99_000)))
            .await;

        assert!(matches!(result, Err(SubscriptionError::Persistence(_))));
        assert!(repo.inserted().is_empty());
    }
}
