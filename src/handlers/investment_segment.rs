use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};

use super::find_by_id;
use crate::app::AppState;
use crate::database::{Function, JsonRow, Procedure, SqlParam};
use crate::error::{ApiError, ResultExt};
use crate::middleware::{ApiResponse, ApiResult};
use crate::models::{parse_id, InvestmentSegmentPayload};

const UPDATE_SEGMENT: &str = r#"
    UPDATE public."InvestmentSegments"
    SET
      "Category" = $1,
      "Description" = $2,
      "IsActive" = COALESCE($3, "IsActive"),
      "UpdatedAt" = NOW()
    WHERE "Id" = $4
    RETURNING "Id"
"#;

const DELETE_SEGMENT: &str =
    r#"DELETE FROM public."InvestmentSegments" WHERE "Id" = $1 RETURNING "Id""#;

/// GET /api/investment/segment
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<JsonRow>> {
    let segments = state
        .gateway
        .call_function(Function::FetchInvestmentSegments, None, &[])
        .await
        .or_internal("Failed to fetch investment segments")?;

    Ok(ApiResponse::success(segments))
}

/// GET /api/investment/segment/:id
pub async fn show(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<JsonRow> {
    let id = parse_id(&id)?;
    let segments = state
        .gateway
        .call_function(Function::FetchInvestmentSegments, None, &[])
        .await
        .or_internal("Failed to fetch investment segment")?;

    let segment = find_by_id(segments, id)
        .ok_or_else(|| ApiError::not_found("Investment segment not found"))?;
    Ok(ApiResponse::success(segment))
}

/// POST /api/investment/segment
pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<InvestmentSegmentPayload>, JsonRejection>,
) -> ApiResult<()> {
    let Json(payload) = payload?;
    let input = payload.validate()?;

    let params = [
        SqlParam::from(input.category.as_str()),
        SqlParam::from(input.description),
        SqlParam::from(input.is_active.unwrap_or(true)),
    ];
    state
        .gateway
        .call_procedure(Procedure::InsertInvestmentSegment, None, &params)
        .await
        .or_internal("Failed to create investment segment")?;

    tracing::info!("Created investment segment {}", input.category);
    Ok(ApiResponse::created("Investment segment created successfully"))
}

/// PUT /api/investment/segment/:id
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<InvestmentSegmentPayload>, JsonRejection>,
) -> ApiResult<()> {
    let id = parse_id(&id)?;
    let Json(payload) = payload?;
    let input = payload.validate()?;

    let params = [
        SqlParam::from(input.category),
        SqlParam::from(input.description),
        SqlParam::from(input.is_active),
        SqlParam::from(id),
    ];
    let updated = state
        .gateway
        .query(UPDATE_SEGMENT, None, &params)
        .await
        .or_internal("Failed to update investment segment")?;
    if updated.is_empty() {
        return Err(ApiError::not_found("Investment segment not found"));
    }

    tracing::info!("Updated investment segment {}", id);
    Ok(ApiResponse::message("Investment segment updated successfully"))
}

/// DELETE /api/investment/segment/:id
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<()> {
    let id = parse_id(&id)?;
    let deleted = state
        .gateway
        .query(DELETE_SEGMENT, None, &[SqlParam::from(id)])
        .await
        .or_internal("Failed to delete investment segment")?;
    if deleted.is_empty() {
        return Err(ApiError::not_found("Investment segment not found"));
    }

    tracing::info!("Deleted investment segment {}", id);
    Ok(ApiResponse::message("Investment segment deleted successfully"))
}
