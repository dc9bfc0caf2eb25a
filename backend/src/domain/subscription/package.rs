//! Package codes with their price and validity period.
//!
//! Prices are whole VND amounts. The string codes (`3_THANG`, ...) are the
//! values clients send and the values stored in `package_details`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{Timestamp, ValidationError};

/// Purchasable subscription package.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PackageCode {
    /// Three months of premium access.
    #[serde(rename = "3_THANG")]
    ThreeMonths,

    /// Six months of premium access.
    #[serde(rename = "6_THANG")]
    SixMonths,

    /// Twelve months of premium access.
    #[serde(rename = "12_THANG")]
    TwelveMonths,
}

impl PackageCode {
    /// Every package on sale.
    pub const ALL: [PackageCode; 3] = [
        PackageCode::ThreeMonths,
        PackageCode::SixMonths,
        PackageCode::TwelveMonths,
    ];

    /// Wire/storage code of this package.
    pub fn as_str(&self) -> &'static str {
        match self {
            PackageCode::ThreeMonths => "3_THANG",
            PackageCode::SixMonths => "6_THANG",
            PackageCode::TwelveMonths => "12_THANG",
        }
    }

    /// List price in VND.
    pub fn price(&self) -> i64 {
        match self {
            PackageCode::ThreeMonths => 99_000,
            PackageCode::SixMonths => 179_000,
            PackageCode::TwelveMonths => 299_000,
        }
    }

    /// Validity period in calendar months.
    pub fn months(&self) -> u32 {
        match self {
            PackageCode::ThreeMonths => 3,
            PackageCode::SixMonths => 6,
            PackageCode::TwelveMonths => 12,
        }
    }

    /// End of the validity period when the package starts at `from`.
    pub fn expiry_from(&self, from: Timestamp) -> Timestamp {
        from.add_calendar_months(self.months())
    }
}

impl fmt::Display for PackageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PackageCode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PackageCode::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| {
                ValidationError::invalid_format(
                    "package_details",
                    format!("Unknown package '{}'", s),
                )
            })
    }
}

/// Price for a raw package code.
///
/// Unknown codes return `0`, which callers must read as "unpriced", never
/// as "free".
pub fn price_of(raw: &str) -> i64 {
    raw.parse::<PackageCode>().map(|p| p.price()).unwrap_or(0)
}

/// Expiry for a raw package code starting at `from`.
///
/// Unknown codes leave `from` unchanged; that result is not a valid expiry.
pub fn expiry_of(raw: &str, from: Timestamp) -> Timestamp {
    raw.parse::<PackageCode>()
        .map(|p| p.expiry_from(from))
        .unwrap_or(from)
}
