use serde::Deserialize;

use super::{integer_in, numeric_present, present, Numeric, ID_RANGE};
use crate::error::ApiError;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangePayload {
    pub country_id: Option<Numeric>,
    pub exchange_code: Option<String>,
    pub name: Option<String>,
    pub iso_mic: Option<String>,
    pub description: Option<String>,
    pub bloomberg_code: Option<String>,
    pub eod_code: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExchangeInput {
    pub country_id: i32,
    pub exchange_code: String,
    pub name: String,
    pub iso_mic: String,
    pub description: Option<String>,
    pub bloomberg_code: Option<String>,
    pub eod_code: Option<String>,
    pub is_active: Option<bool>,
}

impl ExchangePayload {
    pub fn validate(self) -> Result<ExchangeInput, ApiError> {
        let (Some(country_id), Some(exchange_code), Some(name), Some(iso_mic)) = (
            numeric_present(&self.country_id),
            present(&self.exchange_code),
            present(&self.name),
            present(&self.iso_mic),
        ) else {
            return Err(ApiError::missing_fields(
                "Country, Exchange Code, Name, and ISO MIC are required fields",
            ));
        };

        Ok(ExchangeInput {
            country_id: integer_in("countryId", country_id, ID_RANGE)?,
            exchange_code: exchange_code.to_string(),
            name: name.to_string(),
            iso_mic: iso_mic.to_string(),
            description: present(&self.description).map(str::to_string),
            bloomberg_code: present(&self.bloomberg_code).map(str::to_string),
            eod_code: present(&self.eod_code).map(str::to_string),
            is_active: self.is_active,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn optional_codes_collapse_to_none() {
        let payload: ExchangePayload = serde_json::from_value(json!({
            "countryId": "3",
            "exchangeCode": "NSE",
            "name": "National Stock Exchange of India",
            "isoMic": "XNSE",
            "description": "",
            "bloombergCode": "IN"
        }))
        .unwrap();
        let input = payload.validate().unwrap();
        assert_eq!(input.country_id, 3);
        assert_eq!(input.description, None);
        assert_eq!(input.bloomberg_code.as_deref(), Some("IN"));
        assert_eq!(input.eod_code, None);
    }

    #[test]
    fn zero_country_id_counts_as_invalid() {
        let payload: ExchangePayload = serde_json::from_value(json!({
            "countryId": 0,
            "exchangeCode": "NSE",
            "name": "National Stock Exchange of India",
            "isoMic": "XNSE"
        }))
        .unwrap();
        assert_eq!(payload.validate().unwrap_err().error(), "Invalid countryId");
    }

    #[test]
    fn iso_mic_is_required() {
        let payload: ExchangePayload = serde_json::from_value(json!({
            "countryId": 1,
            "exchangeCode": "NSE",
            "name": "National Stock Exchange of India"
        }))
        .unwrap();
        assert_eq!(
            payload.validate().unwrap_err().error(),
            "Missing required fields"
        );
    }
}
