//! Transfer notification body posted by the payment gateway.
//!
//! Only the memo and transferred amount drive reconciliation. Everything
//! else in the payload is kept for logging and otherwise ignored.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Incoming bank transfer notification. Transient, never persisted.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferNotification {
    /// Free-text transfer memo.
    #[serde(default)]
    pub content: Option<String>,

    /// Amount credited, in VND.
    ///
    /// Gateways send either a JSON number or a numeric string. Anything
    /// missing or unparseable becomes `0`, which never covers a price.
    #[serde(default, deserialize_with = "lenient_amount")]
    pub transfer_amount: i64,

    /// Gateway-side transaction id, logged for traceability.
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,

    /// Gateway reference code, logged for traceability.
    #[serde(default)]
    pub reference_code: Option<String>,
}

impl TransferNotification {
    pub fn memo(&self) -> &str {
        self.content.as_deref().unwrap_or("")
    }
}

fn lenient_amount<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let amount = match value {
        Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().and_then(whole_vnd)),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok().and_then(whole_vnd),
        _ => None,
    };
    Ok(amount.unwrap_or(0))
}

fn whole_vnd(raw: f64) -> Option<i64> {
    raw.is_finite().then(|| raw.floor() as i64)
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}
