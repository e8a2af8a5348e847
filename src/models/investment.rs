use serde::Deserialize;

use super::{integer_in, numeric_present, present, Numeric, ID_RANGE};
use crate::error::ApiError;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentSegmentPayload {
    pub category: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InvestmentSegmentInput {
    pub category: String,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

impl InvestmentSegmentPayload {
    pub fn validate(self) -> Result<InvestmentSegmentInput, ApiError> {
        let Some(category) = present(&self.category) else {
            return Err(ApiError::missing_fields("Category is required"));
        };

        Ok(InvestmentSegmentInput {
            category: category.to_string(),
            description: present(&self.description).map(str::to_string),
            is_active: self.is_active,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentTypePayload {
    pub short_code: Option<String>,
    pub description: Option<String>,
    pub investment_segment_id: Option<Numeric>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InvestmentTypeInput {
    pub short_code: String,
    pub description: Option<String>,
    pub investment_segment_id: i32,
    pub is_active: Option<bool>,
}

impl InvestmentTypePayload {
    pub fn validate(self) -> Result<InvestmentTypeInput, ApiError> {
        let (Some(short_code), Some(segment_id)) = (
            present(&self.short_code),
            numeric_present(&self.investment_segment_id),
        ) else {
            return Err(ApiError::missing_fields(
                "Short code and investment segment are required",
            ));
        };

        Ok(InvestmentTypeInput {
            short_code: short_code.to_string(),
            description: present(&self.description).map(str::to_string),
            investment_segment_id: integer_in("investmentSegmentId", segment_id, ID_RANGE)?,
            is_active: self.is_active,
        })
    }
}
