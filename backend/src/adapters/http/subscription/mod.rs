//! HTTP adapter for subscription endpoints.
//!
//! - `POST /api/payment/sepay/create` - Open a pending transfer order
//! - `POST /api/payment/sepay/webhook` - Gateway transfer notification
//! - `GET /api/payment/history` - Current user's payment history
//! - `GET /health` - Liveness probe

pub mod dto;
pub mod handlers;
pub mod routes;

pub use handlers::{AuthenticatedUser, SubscriptionApiError, SubscriptionAppState, USER_ID_HEADER};
pub use routes::{payment_routes, subscription_router};
