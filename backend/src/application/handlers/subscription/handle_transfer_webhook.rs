//! HandleTransferWebhookHandler - Command handler for bank transfer notifications.
//!
//! Steps, in order: authenticate, extract the order id from the memo, match
//! a pending order, check the amount, then activate atomically. Only the
//! first step can reject the request; every later miss is acknowledged so
//! the gateway stops redelivering.

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::domain::foundation::{Timestamp, UserId};
use crate::domain::subscription::{
    OrderId, SubscriptionError, TransferNotification, TransferWebhookVerifier,
};
use crate::ports::{ActivationResult, SubscriptionRepository};

/// Command to reconcile one transfer notification.
#[derive(Debug, Clone)]
pub struct HandleTransferWebhookCommand {
    /// Raw `Authorization` header value, if any.
    pub authorization: Option<String>,
    /// Raw request body.
    pub payload: Vec<u8>,
}

/// Outcome of an authenticated notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// Order flipped to `ACTIVE` and the account upgraded.
    Activated { order_id: OrderId, user_id: UserId },
    /// Body unreadable, or memo carries no order id.
    NoCorrelation,
    /// No pending order with this id (unknown, resolved, or lost a race).
    NoMatchingOrder { order_id: OrderId },
    /// Transfer smaller than the order amount. Order stays pending.
    InsufficientAmount {
        order_id: OrderId,
        expected: i64,
        transferred: i64,
    },
}

impl ReconcileOutcome {
    /// Value of the `outcome` log field.
    pub fn as_str(&self) -> &'static str {
        match self {
            ReconcileOutcome::Activated { .. } => "activated",
            ReconcileOutcome::NoCorrelation => "no_correlation",
            ReconcileOutcome::NoMatchingOrder { .. } => "no_matching_order",
            ReconcileOutcome::InsufficientAmount { .. } => "insufficient_amount",
        }
    }
}

/// Handler for transfer notifications.
pub struct HandleTransferWebhookHandler {
    repository: Arc<dyn SubscriptionRepository>,
    verifier: TransferWebhookVerifier,
}

impl HandleTransferWebhookHandler {
    pub fn new(repository: Arc<dyn SubscriptionRepository>, verifier: TransferWebhookVerifier) -> Self {
        Self {
            repository,
            verifier,
        }
    }

    pub async fn handle(
        &self,
        cmd: HandleTransferWebhookCommand,
    ) -> Result<ReconcileOutcome, SubscriptionError> {
        // 1. Authenticate before looking at anything else
        if let Err(err) = self.verifier.verify(cmd.authorization.as_deref()) {
            if let SubscriptionError::Unauthorized(reason) = &err {
                warn!(reason = reason.as_str(), "Rejected transfer webhook");
            }
            return Err(err);
        }

        let result = self.reconcile(&cmd.payload).await;
        match &result {
            Ok(outcome) => info!(outcome = outcome.as_str(), "Transfer webhook reconciled"),
            Err(err) => error!(
                outcome = "failed",
                retryable = err.is_retryable(),
                error = %err,
                "Transfer webhook reconciliation failed"
            ),
        }
        result
    }

    async fn reconcile(&self, payload: &[u8]) -> Result<ReconcileOutcome, SubscriptionError> {
        // 2. Parse body and extract the correlation token
        let notification: TransferNotification = match serde_json::from_slice(payload) {
            Ok(n) => n,
            Err(e) => {
                warn!(error = %e, "Unreadable transfer webhook body");
                return Ok(ReconcileOutcome::NoCorrelation);
            }
        };

        let Some(order_id) = OrderId::extract_from_memo(notification.memo()) else {
            info!(
                gateway_id = notification.id.as_deref().unwrap_or(""),
                "Transfer memo carries no order id"
            );
            return Ok(ReconcileOutcome::NoCorrelation);
        };

        // 3. Match a pending order
        let Some(mut subscription) = self.repository.find_pending_by_order_id(&order_id).await?
        else {
            return Ok(ReconcileOutcome::NoMatchingOrder { order_id });
        };

        // 4. Amount check against the stored amount
        let transferred = notification.transfer_amount;
        if !subscription.covers(transferred) {
            let expected = subscription.expected_amount();
            warn!(order_id = %order_id, expected, transferred, "Transfer below order amount");
            return Ok(ReconcileOutcome::InsufficientAmount {
                order_id,
                expected,
                transferred,
            });
        }

        // 5. Atomic activation; losing the compare-and-swap means someone else won
        let activation = match subscription.activate(Timestamp::now()) {
            Ok(a) => a,
            Err(_) => return Ok(ReconcileOutcome::NoMatchingOrder { order_id }),
        };

        match self.repository.activate(&activation).await? {
            ActivationResult::Activated => {
                info!(
                    order_id = %order_id,
                    user_id = %activation.user_id,
                    expiry_date = %activation.expiry_date.as_datetime(),
                    "Subscription activated"
                );
                Ok(ReconcileOutcome::Activated {
                    order_id,
                    user_id: activation.user_id,
                })
            }
            ActivationResult::NotPending => Ok(ReconcileOutcome::NoMatchingOrder { order_id }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{DomainError, ErrorCode};
    use crate::domain::subscription::{
        Activation, PackageCode, Subscription, SubscriptionStatus, UnauthorizedReason,
    };
    use crate::ports::InsertResult;
    use async_trait::async_trait;
    use secrecy::SecretString;
    use std::sync::Mutex;

    const SECRET: &str = "gateway-secret";

    // ════════════════════════════════════════════════════════════════════════════
    // Mock Implementations
    // ════════════════════════════════════════════════════════════════════════════

    #[derive(Default)]
    struct MockSubscriptionRepository {
        orders: Mutex<Vec<Subscription>>,
        activations: Mutex<Vec<Activation>>,
        lookups: Mutex<usize>,
        lose_race: bool,
        fail_activate: bool,
    }

    impl MockSubscriptionRepository {
        fn with_order(subscription: Subscription) -> Self {
            let repo = Self::default();
            repo.orders.lock().unwrap().push(subscription);
            repo
        }

        fn activations(&self) -> Vec<Activation> {
            self.activations.lock().unwrap().clone()
        }

        fn lookups(&self) -> usize {
            *self.lookups.lock().unwrap()
        }
    }

    #[async_trait]
    impl SubscriptionRepository for MockSubscriptionRepository {
        async fn insert(&self, subscription: &Subscription) -> Result<InsertResult, DomainError> {
            self.orders.lock().unwrap().push(subscription.clone());
            Ok(InsertResult::Inserted)
        }

        async fn find_pending_by_order_id(
            &self,
            order_id: &OrderId,
        ) -> Result<Option<Subscription>, DomainError> {
            *self.lookups.lock().unwrap() += 1;
            Ok(self
                .orders
                .lock()
                .unwrap()
                .iter()
                .find(|s| &s.order_id == order_id && s.is_pending())
                .cloned())
        }

        async fn activate(&self, activation: &Activation) -> Result<ActivationResult, DomainError> {
            if self.fail_activate {
                return Err(DomainError::new(ErrorCode::DatabaseError, "Simulated failure"));
            }
            if self.lose_race {
                return Ok(ActivationResult::NotPending);
            }
            let mut orders = self.orders.lock().unwrap();
            match orders
                .iter_mut()
                .find(|s| s.order_id == activation.order_id && s.is_pending())
            {
                Some(order) => {
                    order.status = SubscriptionStatus::Active;
                    order.expiry_date = activation.expiry_date;
                    self.activations.lock().unwrap().push(activation.clone());
                    Ok(ActivationResult::Activated)
                }
                None => Ok(ActivationResult::NotPending),
            }
        }
    }

    fn order(millis: i64, amount: i64) -> Subscription {
        Subscription::open_pending(
            OrderId::from_millis(millis),
            UserId::new("user-1").unwrap(),
            PackageCode::ThreeMonths,
            amount,
            Timestamp::now(),
            60,
        )
        .unwrap()
    }

    fn handler(repo: Arc<MockSubscriptionRepository>) -> HandleTransferWebhookHandler {
        HandleTransferWebhookHandler::new(
            repo,
            TransferWebhookVerifier::new(Some(SecretString::new(SECRET.to_string()))),
        )
    }

    fn command(auth: Option<&str>, body: &str) -> HandleTransferWebhookCommand {
        HandleTransferWebhookCommand {
            authorization: auth.map(String::from),
            payload: body.as_bytes().to_vec(),
        }
    }

    fn authed(body: &str) -> HandleTransferWebhookCommand {
        command(Some(&format!("Apikey {}", SECRET)), body)
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Authentication
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn wrong_credential_is_rejected_before_lookup() {
        let repo = Arc::new(MockSubscriptionRepository::with_order(order(100, 99_000)));
        let result = handler(repo.clone())
            .handle(command(
                Some("Apikey wrong"),
                r#"{"content":"DH100","transferAmount":99000}"#,
            ))
            .await;

        assert_eq!(
            result,
            Err(SubscriptionError::Unauthorized(UnauthorizedReason::CredentialMismatch))
        );
        assert_eq!(repo.lookups(), 0);
        assert!(repo.activations().is_empty());
    }

    #[tokio::test]
    async fn missing_credential_is_rejected() {
        let repo = Arc::new(MockSubscriptionRepository::default());
        let result = handler(repo).handle(command(None, "{}")).await;
        assert_eq!(
            result,
            Err(SubscriptionError::Unauthorized(UnauthorizedReason::MissingCredential))
        );
    }

    #[tokio::test]
    async fn unconfigured_secret_rejects_everything() {
        let repo = Arc::new(MockSubscriptionRepository::with_order(order(100, 99_000)));
        let handler = HandleTransferWebhookHandler::new(repo.clone(), TransferWebhookVerifier::new(None));

        let result = handler
            .handle(authed(r#"{"content":"DH100","transferAmount":99000}"#))
            .await;

        assert!(matches!(result, Err(SubscriptionError::Unauthorized(_))));
        assert_eq!(repo.lookups(), 0);
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Activation
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn exact_amount_activates() {
        let repo = Arc::new(MockSubscriptionRepository::with_order(order(100, 99_000)));
        let outcome = handler(repo.clone())
            .handle(authed(r#"{"content":"Thanh toan DH100","transferAmount":99000}"#))
            .await
            .unwrap();

        assert_eq!(
            outcome,
            ReconcileOutcome::Activated {
                order_id: OrderId::from_millis(100),
                user_id: UserId::new("user-1").unwrap(),
            }
        );
        let activations = repo.activations();
        assert_eq!(activations.len(), 1);
        assert!(activations[0].tier.is_premium());
    }

    #[tokio::test]
    async fn overpayment_activates() {
        let repo = Arc::new(MockSubscriptionRepository::with_order(order(100, 99_000)));
        let outcome = handler(repo)
            .handle(authed(r#"{"content":"DH100","transferAmount":150000}"#))
            .await
            .unwrap();
        assert!(matches!(outcome, ReconcileOutcome::Activated { .. }));
    }

    #[tokio::test]
    async fn second_delivery_is_no_matching_order() {
        let repo = Arc::new(MockSubscriptionRepository::with_order(order(100, 99_000)));
        let handler = handler(repo.clone());
        let body = r#"{"content":"DH100","transferAmount":99000}"#;

        handler.handle(authed(body)).await.unwrap();
        let second = handler.handle(authed(body)).await.unwrap();

        assert!(matches!(second, ReconcileOutcome::NoMatchingOrder { .. }));
        assert_eq!(repo.activations().len(), 1);
    }

    #[tokio::test]
    async fn lost_race_is_no_matching_order() {
        let repo = Arc::new(MockSubscriptionRepository {
            lose_race: true,
            ..MockSubscriptionRepository::with_order(order(100, 99_000))
        });
        let outcome = handler(repo)
            .handle(authed(r#"{"content":"DH100","transferAmount":99000}"#))
            .await
            .unwrap();
        assert!(matches!(outcome, ReconcileOutcome::NoMatchingOrder { .. }));
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Acknowledged No-ops
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn short_transfer_leaves_order_pending() {
        let repo = Arc::new(MockSubscriptionRepository::with_order(order(100, 99_000)));
        let outcome = handler(repo.clone())
            .handle(authed(r#"{"content":"DH100","transferAmount":50000}"#))
            .await
            .unwrap();

        assert_eq!(
            outcome,
            ReconcileOutcome::InsufficientAmount {
                order_id: OrderId::from_millis(100),
                expected: 99_000,
                transferred: 50_000,
            }
        );
        assert!(repo.activations().is_empty());
        assert!(repo.orders.lock().unwrap()[0].is_pending());
    }

    #[tokio::test]
    async fn stored_amount_above_price_is_enforced() {
        let repo = Arc::new(MockSubscriptionRepository::with_order(order(100, 120_000)));
        let outcome = handler(repo)
            .handle(authed(r#"{"content":"DH100","transferAmount":99000}"#))
            .await
            .unwrap();
        assert!(matches!(
            outcome,
            ReconcileOutcome::InsufficientAmount { expected: 120_000, .. }
        ));
    }

    #[tokio::test]
    async fn legacy_order_without_amount_checks_price() {
        let mut legacy = order(100, 99_000);
        legacy.amount = None;
        let repo = Arc::new(MockSubscriptionRepository::with_order(legacy));

        let outcome = handler(repo)
            .handle(authed(r#"{"content":"DH100","transferAmount":99000}"#))
            .await
            .unwrap();
        assert!(matches!(outcome, ReconcileOutcome::Activated { .. }));
    }

    #[tokio::test]
    async fn memo_without_order_id_is_no_correlation() {
        let repo = Arc::new(MockSubscriptionRepository::with_order(order(100, 99_000)));
        let outcome = handler(repo.clone())
            .handle(authed(r#"{"content":"chuyen tien","transferAmount":99000}"#))
            .await
            .unwrap();

        assert_eq!(outcome, ReconcileOutcome::NoCorrelation);
        assert_eq!(repo.lookups(), 0);
    }

    #[tokio::test]
    async fn missing_memo_is_no_correlation() {
        let repo = Arc::new(MockSubscriptionRepository::default());
        let outcome = handler(repo).handle(authed(r#"{"transferAmount":99000}"#)).await.unwrap();
        assert_eq!(outcome, ReconcileOutcome::NoCorrelation);
    }

    #[tokio::test]
    async fn unreadable_body_is_no_correlation() {
        let repo = Arc::new(MockSubscriptionRepository::default());
        let outcome = handler(repo).handle(authed("not json")).await.unwrap();
        assert_eq!(outcome, ReconcileOutcome::NoCorrelation);
    }

    #[tokio::test]
    async fn unknown_order_is_no_matching_order() {
        let repo = Arc::new(MockSubscriptionRepository::with_order(order(100, 99_000)));
        let outcome = handler(repo)
            .handle(authed(r#"{"content":"DH999","transferAmount":99000}"#))
            .await
            .unwrap();
        assert_eq!(
            outcome,
            ReconcileOutcome::NoMatchingOrder {
                order_id: OrderId::from_millis(999)
            }
        );
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Infrastructure Errors
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn store_failure_is_persistence_error() {
        let repo = Arc::new(MockSubscriptionRepository {
            fail_activate: true,
            ..MockSubscriptionRepository::with_order(order(100, 99_000))
        });
        let result = handler(repo)
            .handle(authed(r#"{"content":"DH100","transferAmount":99000}"#))
            .await;
        let err = result.unwrap_err();
        assert!(matches!(err, SubscriptionError::Persistence(_)));
        assert!(err.is_retryable());
    }
}
