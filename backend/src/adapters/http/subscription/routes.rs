//! Axum router configuration for subscription endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{
    create_transfer_order, get_payment_history, handle_transfer_webhook, health,
    SubscriptionAppState,
};

/// Create the payment API router, mounted at `/api/payment`.
///
/// # Routes
///
/// ## User Endpoints (require `X-User-Id`)
/// - `POST /sepay/create` - Open a pending transfer order
/// - `GET /history` - Payment history
///
/// ## Webhook Endpoints (no user, shared secret verified)
/// - `POST /sepay/webhook` - Gateway transfer notification
pub fn payment_routes() -> Router<SubscriptionAppState> {
    Router::new()
        .route("/sepay/create", post(create_transfer_order))
        .route("/sepay/webhook", post(handle_transfer_webhook))
        .route("/history", get(get_payment_history))
}

/// Create the complete application router with state applied.
///
/// # Example
///
/// ```ignore
/// let app = subscription_router(state).layer(TraceLayer::new_for_http());
/// axum::serve(listener, app).await?;
/// ```
pub fn subscription_router(state: SubscriptionAppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api/payment", payment_routes())
        .with_state(state)
}
