use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use serde_json::Value;

use super::find_by_id;
use crate::app::AppState;
use crate::database::{Function, Gateway, JsonRow, Procedure, SqlParam};
use crate::error::{ApiError, ResultExt};
use crate::middleware::{ApiResponse, ApiResult};
use crate::models::{parse_id, CountryPayload};

const CURRENCY_ID_BY_CODE: &str =
    r#"SELECT "Id" FROM public."CurrencyMaster" WHERE "CurrencyCode" = $1"#;

const UPDATE_COUNTRY: &str = r#"
    UPDATE public."Country"
    SET "Name" = $1, "IsoCode" = $2, "CurrencyId" = $3, "CountryCode" = $4,
        "IsActive" = COALESCE($5, "IsActive"), "UpdatedAt" = NOW()
    WHERE "Id" = $6
    RETURNING "Id"
"#;

const DELETE_COUNTRY: &str = r#"DELETE FROM public."Country" WHERE "Id" = $1 RETURNING "Id""#;

/// GET /api/country - All countries via FetchCountries
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<JsonRow>> {
    let countries = state
        .gateway
        .call_function(Function::FetchCountries, None, &[])
        .await
        .or_internal("Failed to fetch countries")?;

    Ok(ApiResponse::success(countries))
}

/// GET /api/country/:id
pub async fn show(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<JsonRow> {
    let id = parse_id(&id)?;
    let countries = state
        .gateway
        .call_function(Function::FetchCountries, None, &[])
        .await
        .or_internal("Failed to fetch country")?;

    let country = find_by_id(countries, id).ok_or_else(|| ApiError::not_found("Country not found"))?;
    Ok(ApiResponse::success(country))
}

/// POST /api/country - Create through InsertCountry once the currency code resolves
pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<CountryPayload>, JsonRejection>,
) -> ApiResult<()> {
    let Json(payload) = payload?;
    let input = payload.validate()?;

    // The procedure takes the code; resolving it here rejects unknown codes before any write
    resolve_currency_id(state.gateway.as_ref(), &input.currency_code)
        .await
        .or_internal("Failed to create country")?
        .ok_or_else(invalid_currency)?;

    let params = [
        SqlParam::from(input.name.as_str()),
        SqlParam::from(input.iso_code.as_str()),
        SqlParam::from(input.currency_code.as_str()),
        SqlParam::from(input.country_code),
        SqlParam::from(input.is_active.unwrap_or(true)),
    ];
    state
        .gateway
        .call_procedure(Procedure::InsertCountry, None, &params)
        .await
        .or_internal("Failed to create country")?;

    tracing::info!("Created country {} ({})", input.name, input.iso_code);
    Ok(ApiResponse::created("Country created successfully"))
}

/// PUT /api/country/:id
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<CountryPayload>, JsonRejection>,
) -> ApiResult<()> {
    let id = parse_id(&id)?;
    let Json(payload) = payload?;
    let input = payload.validate()?;

    let currency_id = resolve_currency_id(state.gateway.as_ref(), &input.currency_code)
        .await
        .or_internal("Failed to update country")?
        .ok_or_else(invalid_currency)?;

    let params = [
        SqlParam::from(input.name),
        SqlParam::from(input.iso_code),
        SqlParam::from(currency_id),
        SqlParam::from(input.country_code),
        SqlParam::from(input.is_active),
        SqlParam::from(id),
    ];
    let updated = state
        .gateway
        .query(UPDATE_COUNTRY, None, &params)
        .await
        .or_internal("Failed to update country")?;
    if updated.is_empty() {
        return Err(ApiError::not_found("Country not found"));
    }

    tracing::info!("Updated country {}", id);
    Ok(ApiResponse::message("Country updated successfully"))
}

/// DELETE /api/country/:id
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<()> {
    let id = parse_id(&id)?;
    let deleted = state
        .gateway
        .query(DELETE_COUNTRY, None, &[SqlParam::from(id)])
        .await
        .or_internal("Failed to delete country")?;
    if deleted.is_empty() {
        return Err(ApiError::not_found("Country not found"));
    }

    tracing::info!("Deleted country {}", id);
    Ok(ApiResponse::message("Country deleted successfully"))
}

async fn resolve_currency_id(
    gateway: &dyn Gateway,
    currency_code: &str,
) -> Result<Option<i32>, crate::database::DatabaseError> {
    let rows = gateway
        .query(CURRENCY_ID_BY_CODE, None, &[SqlParam::from(currency_code)])
        .await?;

    Ok(rows
        .first()
        .and_then(|row| row.get("Id"))
        .and_then(Value::as_i64)
        .and_then(|id| i32::try_from(id).ok()))
}

fn invalid_currency() -> ApiError {
    ApiError::bad_request(
        "Invalid currency code",
        "Please update the value in Currency Table.",
    )
}
