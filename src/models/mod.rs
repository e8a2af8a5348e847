//! Request payloads and their server-side validation.
//!
//! Payload fields are all optional so that a missing field is reported with
//! the resource's own message instead of a generic deserialization error.

pub mod country;
pub mod currency;
pub mod exchange;
pub mod investment;

pub use country::{CountryInput, CountryPayload};
pub use currency::{CurrencyInput, CurrencyPayload};
pub use exchange::{ExchangeInput, ExchangePayload};
pub use investment::{
    InvestmentSegmentInput, InvestmentSegmentPayload, InvestmentTypeInput, InvestmentTypePayload,
};

use serde::Deserialize;
use std::ops::RangeInclusive;

use crate::error::ApiError;

/// An integer that clients send either as a JSON number or as a numeric string
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Numeric {
    Number(serde_json::Number),
    Text(String),
}

impl Numeric {
    /// Blank text counts as absent
    fn is_blank(&self) -> bool {
        matches!(self, Numeric::Text(s) if s.trim().is_empty())
    }

    fn as_i64(&self) -> Option<i64> {
        match self {
            Numeric::Number(n) => n.as_i64(),
            Numeric::Text(s) => s.trim().parse().ok(),
        }
    }
}

impl From<i64> for Numeric {
    fn from(v: i64) -> Self {
        Numeric::Number(v.into())
    }
}

impl From<&str> for Numeric {
    fn from(v: &str) -> Self {
        Numeric::Text(v.to_string())
    }
}

/// Valid range for surrogate keys
pub const ID_RANGE: RangeInclusive<i64> = 1..=i32::MAX as i64;

/// Trimmed, non-empty text or `None`
pub(crate) fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

pub(crate) fn numeric_present(value: &Option<Numeric>) -> Option<&Numeric> {
    value.as_ref().filter(|n| !n.is_blank())
}

/// Parse a present numeric field into `range`
pub(crate) fn integer_in(
    field: &str,
    value: &Numeric,
    range: RangeInclusive<i64>,
) -> Result<i32, ApiError> {
    value
        .as_i64()
        .filter(|v| range.contains(v))
        .and_then(|v| i32::try_from(v).ok())
        .ok_or_else(|| {
            ApiError::bad_request(
                format!("Invalid {}", field),
                format!(
                    "{} must be a whole number between {} and {}",
                    field,
                    range.start(),
                    range.end()
                ),
            )
        })
}

/// Parse the `:id` path segment
pub fn parse_id(raw: &str) -> Result<i32, ApiError> {
    raw.trim()
        .parse::<i64>()
        .ok()
        .filter(|v| ID_RANGE.contains(v))
        .map(|v| v as i32)
        .ok_or_else(|| {
            ApiError::bad_request("Invalid id", format!("'{}' is not a valid record id", raw))
        })
}
