//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `http` - Axum REST endpoints
//! - `postgres` - sqlx-backed order and tier persistence
//! - `memory` - In-memory store for tests

pub mod http;
pub mod memory;
pub mod postgres;

pub use memory::InMemorySubscriptionStore;
pub use postgres::{PostgresSubscriptionReader, PostgresSubscriptionRepository};
