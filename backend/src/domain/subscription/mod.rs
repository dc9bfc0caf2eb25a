//! Subscription domain module.
//!
//! Handles the bank-transfer purchase lifecycle: pending orders, memo
//! correlation, webhook authentication and activation.
//!
//! # Module Structure
//!
//! - `aggregate` - Subscription entity and its activation record
//! - `status` - SubscriptionStatus state machine
//! - `package` - Package codes with pricing and expiry policy
//! - `tier` - AccountTier entitlement levels
//! - `order_id` - Human-visible order ids and memo extraction
//! - `notification` - Transfer notification payload from the gateway
//! - `webhook_verifier` - Shared-secret credential check
//! - `errors` - SubscriptionError taxonomy

mod aggregate;
mod errors;
mod notification;
mod order_id;
mod package;
mod status;
mod tier;
mod webhook_verifier;

pub use aggregate::{Activation, Subscription};
pub use errors::{SubscriptionError, UnauthorizedReason};
pub use notification::TransferNotification;
pub use order_id::{OrderId, OrderIdGenerator, ORDER_ID_PREFIX};
pub use package::{expiry_of, price_of, PackageCode};
pub use status::SubscriptionStatus;
pub use tier::AccountTier;
pub use webhook_verifier::TransferWebhookVerifier;
