//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `SubscriptionRepository` - Order store writes and atomic activation
//! - `SubscriptionReader` - Payment history projection

mod subscription_reader;
mod subscription_repository;

pub use subscription_reader::{PaymentHistoryEntry, SubscriptionReader};
pub use subscription_repository::{ActivationResult, InsertResult, SubscriptionRepository};
