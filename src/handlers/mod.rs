// handlers/mod.rs - Reference data resources
//
// One module per resource. Each exposes list/show/create/update/delete and
// reaches the database only through the Gateway in AppState.

pub mod country;
pub mod currency;
pub mod exchange;
pub mod investment_segment;
pub mod investment_type;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::app::AppState;
use crate::database::JsonRow;

pub async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "RiteFolio Admin API",
            "version": version,
            "description": "Reference data management for countries, currencies, exchanges and investment classifications",
            "endpoints": {
                "country": "/api/country[/:id]",
                "currency": "/api/currency[/:id]",
                "exchange": "/api/exchange[/:id]",
                "investment_segment": "/api/investment/segment[/:id]",
                "investment_type": "/api/investment/type[/:id]",
                "health": "/health",
            }
        }
    }))
}

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.gateway.ping(None).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": "database unavailable",
                    "data": {
                        "status": "degraded",
                        "timestamp": now,
                        "database_error": e.to_string()
                    }
                })),
            )
        }
    }
}

/// Pick the row whose `Id` column equals `id`
pub(crate) fn find_by_id(rows: Vec<JsonRow>, id: i32) -> Option<JsonRow> {
    rows.into_iter()
        .find(|row| row.get("Id").and_then(Value::as_i64) == Some(i64::from(id)))
}
