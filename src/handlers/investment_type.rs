use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};

use super::find_by_id;
use crate::app::AppState;
use crate::database::{Function, JsonRow, Procedure, SqlParam};
use crate::error::{ApiError, ResultExt};
use crate::middleware::{ApiResponse, ApiResult};
use crate::models::{parse_id, InvestmentTypePayload};

const UPDATE_TYPE: &str = r#"
    UPDATE public."InvestmentTypes"
    SET
      "InvestmentId" = $1,
      "ShortCode" = $2,
      "Description" = $3,
      "IsActive" = COALESCE($4, "IsActive"),
      "UpdatedAt" = NOW()
    WHERE "Id" = $5
    RETURNING "Id"
"#;

const DELETE_TYPE: &str = r#"DELETE FROM public."InvestmentTypes" WHERE "Id" = $1 RETURNING "Id""#;

/// GET /api/investment/type
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<JsonRow>> {
    let types = state
        .gateway
        .call_function(Function::FetchInvestmentTypes, None, &[])
        .await
        .or_internal("Failed to fetch investment types")?;

    Ok(ApiResponse::success(types))
}

/// GET /api/investment/type/:id
pub async fn show(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<JsonRow> {
    let id = parse_id(&id)?;
    let types = state
        .gateway
        .call_function(Function::FetchInvestmentTypes, None, &[])
        .await
        .or_internal("Failed to fetch investment type")?;

    let investment_type =
        find_by_id(types, id).ok_or_else(|| ApiError::not_found("Investment type not found"))?;
    Ok(ApiResponse::success(investment_type))
}

/// POST /api/investment/type
pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<InvestmentTypePayload>, JsonRejection>,
) -> ApiResult<()> {
    let Json(payload) = payload?;
    let input = payload.validate()?;

    let params = [
        SqlParam::from(input.short_code.as_str()),
        SqlParam::from(input.description),
        SqlParam::from(input.investment_segment_id),
        // p_category: the segment is identified by id
        SqlParam::Text(None),
        SqlParam::from(input.is_active.unwrap_or(true)),
    ];
    state
        .gateway
        .call_procedure(Procedure::InsertInvestmentType, None, &params)
        .await
        .or_internal("Failed to create investment type")?;

    tracing::info!("Created investment type {}", input.short_code);
    Ok(ApiResponse::created("Investment type created successfully"))
}

/// PUT /api/investment/type/:id
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<InvestmentTypePayload>, JsonRejection>,
) -> ApiResult<()> {
    let id = parse_id(&id)?;
    let Json(payload) = payload?;
    let input = payload.validate()?;

    let params = [
        SqlParam::from(input.investment_segment_id),
        SqlParam::from(input.short_code),
        SqlParam::from(input.description),
        SqlParam::from(input.is_active),
        SqlParam::from(id),
    ];
    let updated = state
        .gateway
        .query(UPDATE_TYPE, None, &params)
        .await
        .or_internal("Failed to update investment type")?;
    if updated.is_empty() {
        return Err(ApiError::not_found("Investment type not found"));
    }

    tracing::info!("Updated investment type {}", id);
    Ok(ApiResponse::message("Investment type updated successfully"))
}

/// DELETE /api/investment/type/:id
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<()> {
    let id = parse_id(&id)?;
    let deleted = state
        .gateway
        .query(DELETE_TYPE, None, &[SqlParam::from(id)])
        .await
        .or_internal("Failed to delete investment type")?;
    if deleted.is_empty() {
        return Err(ApiError::not_found("Investment type not found"));
    }

    tracing::info!("Deleted investment type {}", id);
    Ok(ApiResponse::message("Investment type deleted successfully"))
}
