//! PostgreSQL adapters - Database implementations for repository ports.
//!
//! - `PostgresSubscriptionRepository` - Order writes and transactional activation
//! - `PostgresSubscriptionReader` - Payment history queries

mod subscription_reader;
mod subscription_repository;

pub use subscription_reader::PostgresSubscriptionReader;
pub use subscription_repository::PostgresSubscriptionRepository;
