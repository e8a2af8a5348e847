use serde::Deserialize;
use std::ops::RangeInclusive;

use super::{integer_in, numeric_present, present, Numeric};
use crate::error::ApiError;

/// Numeric country code: one to four digits
pub const COUNTRY_CODE_RANGE: RangeInclusive<i64> = 1..=9999;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountryPayload {
    pub name: Option<String>,
    pub iso_code: Option<String>,
    pub currency_code: Option<String>,
    pub country_code: Option<Numeric>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CountryInput {
    pub name: String,
    pub iso_code: String,
    pub currency_code: String,
    pub country_code: i32,
    pub is_active: Option<bool>,
}

impl CountryPayload {
    pub fn validate(self) -> Result<CountryInput, ApiError> {
        let (Some(name), Some(iso_code), Some(currency_code), Some(country_code)) = (
            present(&self.name),
            present(&self.iso_code),
            present(&self.currency_code),
            numeric_present(&self.country_code),
        ) else {
            return Err(ApiError::missing_fields(
                "Name, isoCode, currencyCode, and countryCode are required",
            ));
        };

        Ok(CountryInput {
            name: name.to_string(),
            iso_code: iso_code.to_string(),
            currency_code: currency_code.to_string(),
            country_code: integer_in("countryCode", country_code, COUNTRY_CODE_RANGE)?,
            is_active: self.is_active,
        })
    }
}
