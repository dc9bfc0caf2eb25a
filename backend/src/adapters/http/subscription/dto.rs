//! Request and response DTOs for subscription endpoints.
//!
//! Every body carries a `success` flag; payloads sit under `data`.

use serde::{Deserialize, Serialize};

use crate::application::CreateTransferOrderResult;
use crate::ports::PaymentHistoryEntry;

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Request to open a transfer order.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTransferOrderRequest {
    #[serde(default)]
    pub package_details: Option<String>,
    #[serde(default)]
    pub amount: Option<i64>,
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Success envelope with a payload.
#[derive(Debug, Clone, Serialize)]
pub struct DataResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> DataResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Envelope with only a message. Used for webhook acknowledgements and errors.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
}

impl MessageResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            error_code: None,
        }
    }

    pub fn error(error_code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            error_code: Some(error_code.into()),
        }
    }
}

/// Payment instructions for a new order.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferOrderResponse {
    pub order_id: String,
    pub amount: i64,
    pub bank_account: String,
    pub bank_name: String,
}

impl From<CreateTransferOrderResult> for TransferOrderResponse {
    fn from(result: CreateTransferOrderResult) -> Self {
        Self {
            order_id: result.order_id.to_string(),
            amount: result.amount,
            bank_account: result.bank_account,
            bank_name: result.bank_name,
        }
    }
}

/// Payment history payload.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentHistoryResponse {
    pub history: Vec<PaymentHistoryItem>,
}

/// One history row as shown to the account holder.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentHistoryItem {
    pub id: String,
    pub transaction_id: String,
    pub package: String,
    pub amount: i64,
    pub status: String,
    pub status_text: String,
    pub start_date: String,
    pub expiry_date: String,
}

impl From<PaymentHistoryEntry> for PaymentHistoryItem {
    fn from(entry: PaymentHistoryEntry) -> Self {
        Self {
            id: entry.id.to_string(),
            transaction_id: entry.order_id.to_string(),
            amount: entry.display_amount(),
            status: entry.status.as_str().to_string(),
            status_text: entry.status.display_label().to_string(),
            start_date: entry.start_date.as_datetime().to_rfc3339(),
            expiry_date: entry.expiry_date.as_datetime().to_rfc3339(),
            package: entry.package,
        }
    }
}
