//! HTTP handlers for subscription endpoints.
//!
//! These handlers connect Axum routes to application layer command/query handlers.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Bytes;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequestParts, Json, State};
use axum::http::request::Parts;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use http::header::AUTHORIZATION;

use crate::application::{
    CreateTransferOrderCommand, CreateTransferOrderHandler, GetPaymentHistoryHandler,
    GetPaymentHistoryQuery, HandleTransferWebhookCommand, HandleTransferWebhookHandler,
    ReconcileOutcome, TransferCheckoutSettings,
};
use crate::domain::foundation::{DomainError, UserId};
use crate::domain::subscription::{OrderIdGenerator, SubscriptionError, TransferWebhookVerifier};
use crate::ports::{SubscriptionReader, SubscriptionRepository};

use super::dto::{
    CreateTransferOrderRequest, DataResponse, MessageResponse, PaymentHistoryItem,
    PaymentHistoryResponse, TransferOrderResponse,
};

/// Header carrying the trusted caller identity.
pub const USER_ID_HEADER: &str = "X-User-Id";

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared application state containing all dependencies.
///
/// Cloned for each request; dependencies are Arc-wrapped.
#[derive(Clone)]
pub struct SubscriptionAppState {
    pub subscription_repository: Arc<dyn SubscriptionRepository>,
    pub subscription_reader: Arc<dyn SubscriptionReader>,
    pub order_ids: Arc<OrderIdGenerator>,
    pub checkout: TransferCheckoutSettings,
    pub verifier: TransferWebhookVerifier,
}

impl SubscriptionAppState {
    pub fn create_order_handler(&self) -> CreateTransferOrderHandler {
        CreateTransferOrderHandler::new(
            self.subscription_repository.clone(),
            self.order_ids.clone(),
            self.checkout.clone(),
        )
    }

    pub fn webhook_handler(&self) -> HandleTransferWebhookHandler {
        HandleTransferWebhookHandler::new(
            self.subscription_repository.clone(),
            self.verifier.clone(),
        )
    }

    pub fn history_handler(&self) -> GetPaymentHistoryHandler {
        GetPaymentHistoryHandler::new(self.subscription_reader.clone())
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// User Context
// ════════════════════════════════════════════════════════════════════════════════

/// Caller identity, taken from `X-User-Id` as set by the upstream gateway.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: UserId,
}

/// Rejection type for AuthenticatedUser extraction.
pub struct AuthenticationRequired;

impl IntoResponse for AuthenticationRequired {
    fn into_response(self) -> Response {
        let body = MessageResponse::error("AUTHENTICATION_REQUIRED", "Authentication is required");
        (StatusCode::UNAUTHORIZED, Json(body)).into_response()
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AuthenticationRequired;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| UserId::new(s).ok())
            .ok_or(AuthenticationRequired)?;

        Ok(AuthenticatedUser { user_id })
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Query Handlers (GET endpoints)
// ════════════════════════════════════════════════════════════════════════════════

/// GET /api/payment/history - Current user's orders, newest first
pub async fn get_payment_history(
    State(state): State<SubscriptionAppState>,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, SubscriptionApiError> {
    let handler = state.history_handler();
    let query = GetPaymentHistoryQuery {
        user_id: user.user_id,
    };

    let history = handler.handle(query).await?;

    let response = PaymentHistoryResponse {
        history: history.into_iter().map(PaymentHistoryItem::from).collect(),
    };
    Ok(Json(DataResponse::ok(response)))
}

/// GET /health - Liveness probe
pub async fn health() -> impl IntoResponse {
    Json(MessageResponse::ok("OK"))
}

// ════════════════════════════════════════════════════════════════════════════════
// Command Handlers (POST endpoints)
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/payment/sepay/create - Open a pending transfer order
pub async fn create_transfer_order(
    State(state): State<SubscriptionAppState>,
    user: AuthenticatedUser,
    request: Result<Json<CreateTransferOrderRequest>, JsonRejection>,
) -> Result<impl IntoResponse, SubscriptionApiError> {
    let Json(request) = request
        .map_err(|e| SubscriptionError::invalid_request("body", e.body_text()))?;

    let handler = state.create_order_handler();
    let cmd = CreateTransferOrderCommand {
        user_id: user.user_id,
        package_details: request.package_details,
        amount: request.amount,
    };

    let result = handler.handle(cmd).await?;

    Ok(Json(DataResponse::ok(TransferOrderResponse::from(result))))
}

/// POST /api/payment/sepay/webhook - Gateway transfer notification
///
/// Only credential failures are rejected. Everything else answers 200 so
/// the gateway does not redeliver; `success` is false only when the store
/// failed.
pub async fn handle_transfer_webhook(
    State(state): State<SubscriptionAppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let authorization = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(String::from);

    let handler = state.webhook_handler();
    let cmd = HandleTransferWebhookCommand {
        authorization,
        payload: body.to_vec(),
    };

    match handler.handle(cmd).await {
        Ok(outcome) => (StatusCode::OK, Json(MessageResponse::ok(ack_message(&outcome)))).into_response(),
        Err(err @ SubscriptionError::Unauthorized(_)) => SubscriptionApiError(err).into_response(),
        Err(err) => {
            let body = MessageResponse::error(err.code().to_string(), "Server Error");
            (StatusCode::OK, Json(body)).into_response()
        }
    }
}

fn ack_message(outcome: &ReconcileOutcome) -> &'static str {
    match outcome {
        ReconcileOutcome::Activated { .. } => "Success",
        ReconcileOutcome::NoCorrelation => "Ignored (No Order ID)",
        ReconcileOutcome::NoMatchingOrder { .. } => "Sub not found or processed",
        ReconcileOutcome::InsufficientAmount { .. } => "Insufficient amount",
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error type that converts domain errors to HTTP responses.
#[derive(Debug)]
pub struct SubscriptionApiError(SubscriptionError);

impl From<SubscriptionError> for SubscriptionApiError {
    fn from(err: SubscriptionError) -> Self {
        Self(err)
    }
}

impl From<DomainError> for SubscriptionApiError {
    fn from(err: DomainError) -> Self {
        Self(SubscriptionError::from(err))
    }
}

impl IntoResponse for SubscriptionApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            SubscriptionError::InvalidRequest { .. } => StatusCode::BAD_REQUEST,
            SubscriptionError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            SubscriptionError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = MessageResponse::error(self.0.code().to_string(), self.0.message());
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::subscription::{OrderId, UnauthorizedReason};
    use axum::http::Request;

    #[test]
    fn invalid_request_maps_to_400() {
        let response =
            SubscriptionApiError(SubscriptionError::invalid_request("amount", "bad")).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn unauthorized_maps_to_401() {
        let response = SubscriptionApiError(SubscriptionError::unauthorized(
            UnauthorizedReason::CredentialMismatch,
        ))
        .into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn persistence_maps_to_500() {
        let response = SubscriptionApiError(SubscriptionError::persistence("down")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn ack_messages_are_distinct_per_outcome() {
        let order_id = OrderId::from_millis(1);
        let messages = [
            ack_message(&ReconcileOutcome::Activated {
                order_id: order_id.clone(),
                user_id: UserId::new("u").unwrap(),
            }),
            ack_message(&ReconcileOutcome::NoCorrelation),
            ack_message(&ReconcileOutcome::NoMatchingOrder {
                order_id: order_id.clone(),
            }),
            ack_message(&ReconcileOutcome::InsufficientAmount {
                order_id,
                expected: 2,
                transferred: 1,
            }),
        ];
        for (i, a) in messages.iter().enumerate() {
            for b in &messages[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[tokio::test]
    async fn extractor_reads_user_header() {
        let (mut parts, _) = Request::builder()
            .header(USER_ID_HEADER, "user-42")
            .body(())
            .unwrap()
            .into_parts();

        let user = AuthenticatedUser::from_request_parts(&mut parts, &()).await.ok().unwrap();
        assert_eq!(user.user_id.as_str(), "user-42");
    }

    #[tokio::test]
    async fn extractor_rejects_blank_header() {
        let (mut parts, _) = Request::builder()
            .header(USER_ID_HEADER, "  ")
            .body(())
            .unwrap()
            .into_parts();

        assert!(AuthenticatedUser::from_request_parts(&mut parts, &())
            .await
            .is_err());
    }
}
