//! PostgreSQL implementation of SubscriptionRepository.
//!
//! Orders live in `subscriptions`. The account tier lives in the externally
//! owned `users` table; only its `tier` column is written here.

use crate::domain::foundation::{DomainError, ErrorCode, SubscriptionId, Timestamp, UserId};
use crate::domain::subscription::{Activation, OrderId, PackageCode, Subscription, SubscriptionStatus};
use crate::ports::{ActivationResult, InsertResult, SubscriptionRepository};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// PostgreSQL implementation of the SubscriptionRepository port.
pub struct PostgresSubscriptionRepository {
    pool: PgPool,
}

impl PostgresSubscriptionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of a subscription.
#[derive(Debug, sqlx::FromRow)]
pub(super) struct SubscriptionRow {
    pub subscription_id: Uuid,
    pub payment_transaction_id: String,
    pub user_id: String,
    pub package_details: String,
    pub amount: Option<i64>,
    pub status: String,
    pub start_date: DateTime<Utc>,
    pub expiry_date: DateTime<Utc>,
}

impl TryFrom<SubscriptionRow> for Subscription {
    type Error = DomainError;

    fn try_from(row: SubscriptionRow) -> Result<Self, Self::Error> {
        Ok(Subscription {
            id: SubscriptionId::from_uuid(row.subscription_id),
            order_id: OrderId::parse(row.payment_transaction_id).map_err(corrupt_row)?,
            user_id: UserId::new(row.user_id).map_err(corrupt_row)?,
            package: row.package_details.parse::<PackageCode>().map_err(corrupt_row)?,
            amount: row.amount,
            status: parse_status(&row.status)?,
            start_date: Timestamp::from_datetime(row.start_date),
            expiry_date: Timestamp::from_datetime(row.expiry_date),
        })
    }
}

pub(super) fn parse_status(s: &str) -> Result<SubscriptionStatus, DomainError> {
    s.parse::<SubscriptionStatus>().map_err(corrupt_row)
}

pub(super) fn corrupt_row(err: impl std::fmt::Display) -> DomainError {
    DomainError::new(
        ErrorCode::CorruptRecord,
        format!("Invalid subscription row: {}", err),
    )
}

#[async_trait]
impl SubscriptionRepository for PostgresSubscriptionRepository {
    async fn insert(&self, subscription: &Subscription) -> Result<InsertResult, DomainError> {
        let result = sqlx::query(
            r#"
            INSERT INTO subscriptions (
                subscription_id, payment_transaction_id, user_id, package_details,
                amount, status, start_date, expiry_date
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(subscription.id.as_uuid())
        .bind(subscription.order_id.as_str())
        .bind(subscription.user_id.as_str())
        .bind(subscription.package.as_str())
        .bind(subscription.amount)
        .bind(subscription.status.as_str())
        .bind(subscription.start_date.as_datetime())
        .bind(subscription.expiry_date.as_datetime())
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(InsertResult::Inserted),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Ok(InsertResult::DuplicateOrderId)
            }
            Err(e) => Err(DomainError::database("Failed to insert subscription", e)),
        }
    }

    async fn find_pending_by_order_id(
        &self,
        order_id: &OrderId,
    ) -> Result<Option<Subscription>, DomainError> {
        let row: Option<SubscriptionRow> = sqlx::query_as(
            r#"
            SELECT subscription_id, payment_transaction_id, user_id, package_details,
                   amount, status, start_date, expiry_date
            FROM subscriptions
            WHERE payment_transaction_id = $1 AND status = 'PENDING'
            "#,
        )
        .bind(order_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to find pending subscription", e))?;

        row.map(Subscription::try_from).transpose()
    }

    async fn activate(&self, activation: &Activation) -> Result<ActivationResult, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::database("Failed to begin activation", e))?;

        // Compare-and-swap: only a still-pending row is flipped
        let flipped = sqlx::query(
            r#"
            UPDATE subscriptions
            SET status = 'ACTIVE', expiry_date = $2
            WHERE payment_transaction_id = $1 AND status = 'PENDING'
            "#,
        )
        .bind(activation.order_id.as_str())
        .bind(activation.expiry_date.as_datetime())
        .execute(&mut *tx)
        .await
        .map_err(|e| DomainError::database("Failed to activate subscription", e))?;

        if flipped.rows_affected() == 0 {
            tx.rollback()
                .await
                .map_err(|e| DomainError::database("Failed to roll back activation", e))?;
            return Ok(ActivationResult::NotPending);
        }

        let upgraded = sqlx::query("UPDATE users SET tier = $1 WHERE user_id = $2")
            .bind(activation.tier.as_str())
            .bind(activation.user_id.as_str())
            .execute(&mut *tx)
            .await
            .map_err(|e| DomainError::database("Failed to upgrade account tier", e))?;

        if upgraded.rows_affected() == 0 {
            tx.rollback()
                .await
                .map_err(|e| DomainError::database("Failed to roll back activation", e))?;
            return Err(DomainError::new(
                ErrorCode::AccountNotFound,
                format!("Account not found: {}", activation.user_id),
            ));
        }

        tx.commit()
            .await
            .map_err(|e| DomainError::database("Failed to commit activation", e))?;

        Ok(ActivationResult::Activated)
    }
}
