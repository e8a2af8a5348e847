use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};

use crate::app::AppState;
use crate::database::{JsonRow, Procedure, SqlParam};
use crate::error::{ApiError, ResultExt};
use crate::middleware::{ApiResponse, ApiResult};
use crate::models::{parse_id, CurrencyPayload};

const LIST_CURRENCIES: &str = r#"SELECT * FROM public."CurrencyMaster" ORDER BY "Id" DESC"#;

const CURRENCY_BY_ID: &str = r#"SELECT * FROM public."CurrencyMaster" WHERE "Id" = $1"#;

const UPDATE_CURRENCY: &str = r#"
    UPDATE public."CurrencyMaster"
    SET "Name" = $1, "CurrencyCode" = $2, "CurrencySymbol" = $3,
        "IsActive" = COALESCE($4, "IsActive"), "UpdatedAt" = NOW()
    WHERE "Id" = $5
    RETURNING "Id"
"#;

const DELETE_CURRENCY: &str =
    r#"DELETE FROM public."CurrencyMaster" WHERE "Id" = $1 RETURNING "Id""#;

/// GET /api/currency - Newest first
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<JsonRow>> {
    let currencies = state
        .gateway
        .query(LIST_CURRENCIES, None, &[])
        .await
        .or_internal("Failed to fetch currencies")?;

    Ok(ApiResponse::success(currencies))
}

/// GET /api/currency/:id
pub async fn show(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<JsonRow> {
    let id = parse_id(&id)?;
    let currency = state
        .gateway
        .query(CURRENCY_BY_ID, None, &[SqlParam::from(id)])
        .await
        .or_internal("Failed to fetch currency")?
        .into_iter()
        .next()
        .ok_or_else(|| ApiError::not_found("Currency not found"))?;

    Ok(ApiResponse::success(currency))
}

/// POST /api/currency - Create through InsertCurrency
pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<CurrencyPayload>, JsonRejection>,
) -> ApiResult<()> {
    let Json(payload) = payload?;
    let input = payload.validate()?;

    let params = [
        SqlParam::from(input.name.as_str()),
        SqlParam::from(input.currency_code.as_str()),
        SqlParam::from(input.currency_symbol),
        SqlParam::from(input.is_active.unwrap_or(true)),
    ];
    state
        .gateway
        .call_procedure(Procedure::InsertCurrency, None, &params)
        .await
        .or_internal("Failed to create currency")?;

    tracing::info!("Created currency {} ({})", input.name, input.currency_code);
    Ok(ApiResponse::created("Currency created successfully"))
}

/// PUT /api/currency/:id
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<CurrencyPayload>, JsonRejection>,
) -> ApiResult<()> {
    let id = parse_id(&id)?;
    let Json(payload) = payload?;
    let input = payload.validate()?;

    let params = [
        SqlParam::from(input.name),
        SqlParam::from(input.currency_code),
        SqlParam::from(input.currency_symbol),
        SqlParam::from(input.is_active),
        SqlParam::from(id),
    ];
    let updated = state
        .gateway
        .query(UPDATE_CURRENCY, None, &params)
        .await
        .or_internal("Failed to update currency")?;
    if updated.is_empty() {
        return Err(ApiError::not_found("Currency not found"));
    }

    tracing::info!("Updated currency {}", id);
    Ok(ApiResponse::message("Currency updated successfully"))
}

/// DELETE /api/currency/:id
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<()> {
    let id = parse_id(&id)?;
    let deleted = state
        .gateway
        .query(DELETE_CURRENCY, None, &[SqlParam::from(id)])
        .await
        .or_internal("Failed to delete currency")?;
    if deleted.is_empty() {
        return Err(ApiError::not_found("Currency not found"));
    }

    tracing::info!("Deleted currency {}", id);
    Ok(ApiResponse::message("Currency deleted successfully"))
}
