use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};

use super::find_by_id;
use crate::app::AppState;
use crate::database::{Function, JsonRow, Procedure, SqlParam};
use crate::error::{ApiError, ResultExt};
use crate::middleware::{ApiResponse, ApiResult};
use crate::models::{parse_id, ExchangeInput, ExchangePayload};

const UPDATE_EXCHANGE: &str = r#"
    UPDATE public."StockExchanges"
    SET
      "CountryId" = $1,
      "ExchangeCode" = $2,
      "Name" = $3,
      "IsoMic" = $4,
      "Description" = $5,
      "BloombergCode" = $6,
      "EodCode" = $7,
      "IsActive" = COALESCE($8, "IsActive"),
      "UpdatedAt" = NOW()
    WHERE "Id" = $9
    RETURNING "Id"
"#;

const DELETE_EXCHANGE: &str =
    r#"DELETE FROM public."StockExchanges" WHERE "Id" = $1 RETURNING "Id""#;

/// GET /api/exchange - All exchanges via FetchExchange
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<JsonRow>> {
    let exchanges = state
        .gateway
        .call_function(Function::FetchExchange, None, &[])
        .await
        .or_internal("Failed to fetch exchanges")?;

    Ok(ApiResponse::success(exchanges))
}

/// GET /api/exchange/:id
pub async fn show(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<JsonRow> {
    let id = parse_id(&id)?;
    let exchanges = state
        .gateway
        .call_function(Function::FetchExchange, None, &[])
        .await
        .or_internal("Failed to fetch exchange")?;

    let exchange =
        find_by_id(exchanges, id).ok_or_else(|| ApiError::not_found("Exchange not found"))?;
    Ok(ApiResponse::success(exchange))
}

/// POST /api/exchange - Create through InsertStockExchange
pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<ExchangePayload>, JsonRejection>,
) -> ApiResult<()> {
    let Json(payload) = payload?;
    let input = payload.validate()?;
    let label = format!("{} ({})", input.name, input.iso_mic);
    let is_active = input.is_active.unwrap_or(true);

    let mut params = exchange_params(input);
    params.push(SqlParam::from(is_active));
    state
        .gateway
        .call_procedure(Procedure::InsertStockExchange, None, &params)
        .await
        .or_internal("Failed to create exchange")?;

    tracing::info!("Created exchange {}", label);
    Ok(ApiResponse::created("Exchange created successfully"))
}

/// PUT /api/exchange/:id
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<ExchangePayload>, JsonRejection>,
) -> ApiResult<()> {
    let id = parse_id(&id)?;
    let Json(payload) = payload?;
    let input = payload.validate()?;
    let is_active = input.is_active;

    let mut params = exchange_params(input);
    params.push(SqlParam::from(is_active));
    params.push(SqlParam::from(id));
    let updated = state
        .gateway
        .query(UPDATE_EXCHANGE, None, &params)
        .await
        .or_internal("Failed to update exchange")?;
    if updated.is_empty() {
        return Err(ApiError::not_found("Exchange not found"));
    }

    tracing::info!("Updated exchange {}", id);
    Ok(ApiResponse::message("Exchange updated successfully"))
}

/// DELETE /api/exchange/:id
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<()> {
    let id = parse_id(&id)?;
    let deleted = state
        .gateway
        .query(DELETE_EXCHANGE, None, &[SqlParam::from(id)])
        .await
        .or_internal("Failed to delete exchange")?;
    if deleted.is_empty() {
        return Err(ApiError::not_found("Exchange not found"));
    }

    tracing::info!("Deleted exchange {}", id);
    Ok(ApiResponse::message("Exchange deleted successfully"))
}

/// Columns shared by insert and update, in procedure order
fn exchange_params(input: ExchangeInput) -> Vec<SqlParam> {
    vec![
        SqlParam::from(input.country_id),
        SqlParam::from(input.exchange_code),
        SqlParam::from(input.name),
        SqlParam::from(input.iso_mic),
        SqlParam::from(input.description),
        SqlParam::from(input.bloomberg_code),
        SqlParam::from(input.eod_code),
    ]
}
