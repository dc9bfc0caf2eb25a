//! PostgreSQL implementation of SubscriptionReader.

use crate::domain::foundation::{DomainError, SubscriptionId, Timestamp, UserId};
use crate::domain::subscription::OrderId;
use crate::ports::{PaymentHistoryEntry, SubscriptionReader};
use async_trait::async_trait;
use sqlx::PgPool;

use super::subscription_repository::{corrupt_row, parse_status, SubscriptionRow};

/// PostgreSQL implementation of the SubscriptionReader port.
pub struct PostgresSubscriptionReader {
    pool: PgPool,
}

impl PostgresSubscriptionReader {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl TryFrom<SubscriptionRow> for PaymentHistoryEntry {
    type Error = DomainError;

    // Package stays raw so retired codes still list.
    fn try_from(row: SubscriptionRow) -> Result<Self, Self::Error> {
        Ok(PaymentHistoryEntry {
            id: SubscriptionId::from_uuid(row.subscription_id),
            order_id: OrderId::parse(row.payment_transaction_id).map_err(corrupt_row)?,
            package: row.package_details,
            amount: row.amount,
            status: parse_status(&row.status)?,
            start_date: Timestamp::from_datetime(row.start_date),
            expiry_date: Timestamp::from_datetime(row.expiry_date),
        })
    }
}

#[async_trait]
impl SubscriptionReader for PostgresSubscriptionReader {
    async fn list_history(&self, user_id: &UserId) -> Result<Vec<PaymentHistoryEntry>, DomainError> {
        let rows: Vec<SubscriptionRow> = sqlx::query_as(
            r#"
            SELECT subscription_id, payment_transaction_id, user_id, package_details,
                   amount, status, start_date, expiry_date
            FROM subscriptions
            WHERE user_id = $1
            ORDER BY start_date DESC
            "#,
        )
        .bind(user_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to list payment history", e))?;

        rows.into_iter().map(PaymentHistoryEntry::try_from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    #[test]
    fn retired_package_still_converts() {
        let entry = PaymentHistoryEntry::try_from(SubscriptionRow {
            subscription_id: Uuid::new_v4(),
            payment_transaction_id: "DH42".to_string(),
            user_id: "user-1".to_string(),
            package_details: "1_THANG".to_string(),
            amount: Some(39_000),
            status: "EXPIRED".to_string(),
            start_date: Utc::now(),
            expiry_date: Utc::now(),
        })
        .unwrap();

        assert_eq!(entry.package, "1_THANG");
        assert_eq!(entry.display_amount(), 39_000);
    }
}
