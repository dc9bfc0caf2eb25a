//! GetPaymentHistoryHandler - Query handler for an account's orders.

use std::sync::Arc;

use crate::domain::foundation::UserId;
use crate::domain::subscription::SubscriptionError;
use crate::ports::{PaymentHistoryEntry, SubscriptionReader};

/// Query for payment history.
#[derive(Debug, Clone)]
pub struct GetPaymentHistoryQuery {
    pub user_id: UserId,
}

/// Orders newest first.
pub type GetPaymentHistoryResult = Vec<PaymentHistoryEntry>;

/// Handler for retrieving payment history.
pub struct GetPaymentHistoryHandler {
    reader: Arc<dyn SubscriptionReader>,
}

impl GetPaymentHistoryHandler {
    pub fn new(reader: Arc<dyn SubscriptionReader>) -> Self {
        Self { reader }
    }

    pub async fn handle(
        &self,
        query: GetPaymentHistoryQuery,
    ) -> Result<GetPaymentHistoryResult, SubscriptionError> {
        let history = self.reader.list_history(&query.user_id).await?;
        Ok(history)
    }
}
