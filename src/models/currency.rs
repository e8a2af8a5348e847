use serde::Deserialize;

use super::present;
use crate::error::ApiError;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrencyPayload {
    pub name: Option<String>,
    pub currency_code: Option<String>,
    pub currency_symbol: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CurrencyInput {
    pub name: String,
    pub currency_code: String,
    pub currency_symbol: String,
    pub is_active: Option<bool>,
}

impl CurrencyPayload {
    pub fn validate(self) -> Result<CurrencyInput, ApiError> {
        let (Some(name), Some(currency_code), Some(currency_symbol)) = (
            present(&self.name),
            present(&self.currency_code),
            present(&self.currency_symbol),
        ) else {
            return Err(ApiError::missing_fields(
                "Name, currencyCode, and currencySymbol are required",
            ));
        };

        Ok(CurrencyInput {
            name: name.to_string(),
            currency_code: currency_code.to_string(),
            currency_symbol: currency_symbol.to_string(),
            is_active: self.is_active,
        })
    }
}
