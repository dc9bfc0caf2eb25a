//! Subscription handlers.
//!
//! ## Commands
//! - Opening a pending bank-transfer order
//! - Reconciling gateway transfer notifications
//!
//! ## Queries
//! - Payment history for an account

mod create_transfer_order;
mod get_payment_history;
mod handle_transfer_webhook;

// Commands
pub use create_transfer_order::{
    CreateTransferOrderCommand, CreateTransferOrderHandler, CreateTransferOrderResult,
    TransferCheckoutSettings,
};
pub use handle_transfer_webhook::{
    HandleTransferWebhookCommand, HandleTransferWebhookHandler, ReconcileOutcome,
};

// Queries
pub use get_payment_history::{
    GetPaymentHistoryHandler, GetPaymentHistoryQuery, GetPaymentHistoryResult,
};
