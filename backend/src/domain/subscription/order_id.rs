//! Human-visible order ids.
//!
//! The payer copies the order id into the bank transfer memo, and the
//! webhook reconciler recovers it from there. Format is the literal `DH`
//! followed by decimal digits (the creation time in Unix milliseconds).

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};

use crate::domain::foundation::{Timestamp, ValidationError};

/// Literal prefix of every order id.
pub const ORDER_ID_PREFIX: &str = "DH";

// ASCII digits only; Unicode `\d` would admit ids `parse` rejects.
static ORDER_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"DH[0-9]+").unwrap());

/// Correlation key between a bank transfer and a subscription order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(String);

impl OrderId {
    /// Parses a complete order id. The whole input must be `DH` plus digits.
    pub fn parse(raw: impl Into<String>) -> Result<Self, ValidationError> {
        let raw = raw.into();
        let digits = raw.strip_prefix(ORDER_ID_PREFIX).ok_or_else(|| {
            ValidationError::invalid_format("order_id", "missing DH prefix")
        })?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ValidationError::invalid_format(
                "order_id",
                "expected decimal digits after DH prefix",
            ));
        }
        Ok(Self(raw))
    }

    /// Builds the order id for a creation time in Unix milliseconds.
    pub fn from_millis(millis: i64) -> Self {
        Self(format!("{}{}", ORDER_ID_PREFIX, millis))
    }

    /// Finds the first order id token anywhere inside a free-text memo.
    ///
    /// Bank apps mangle memos freely (prefixes, suffixes, spacing), so the
    /// match is unanchored. Only the first token counts.
    pub fn extract_from_memo(memo: &str) -> Option<Self> {
        ORDER_TOKEN.find(memo).map(|m| Self(m.as_str().to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Issues order ids that are strictly increasing within the process.
///
/// Ids derive from the wall clock, so two orders opened in the same
/// millisecond would collide. The generator bumps past the last issued
/// value instead. Cross-process collisions are still possible and are caught
/// by the unique index on insert.
#[derive(Debug, Default)]
pub struct OrderIdGenerator {
    last: AtomicI64,
}

impl OrderIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next id based on the current time.
    pub fn next(&self) -> OrderId {
        self.next_at(Timestamp::now().as_unix_millis())
    }

    /// Next id given the current time in Unix milliseconds.
    pub fn next_at(&self, now_millis: i64) -> OrderId {
        let mut issued = now_millis;
        // fetch_update only fails when the closure returns None.
        let _ = self
            .last
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                issued = now_millis.max(last.saturating_add(1));
                Some(issued)
            });
        OrderId::from_millis(issued)
    }
}
