use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::{json, Value};

/// Body of a successful response: either a payload or a confirmation message
#[derive(Debug)]
pub enum Payload<T: Serialize> {
    Data(T),
    Message(String),
}

/// Wrapper for API responses that automatically adds success envelope
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    pub payload: Payload<T>,
    pub status_code: Option<StatusCode>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a successful API response with default 200 status
    pub fn success(data: T) -> Self {
        Self {
            payload: Payload::Data(data),
            status_code: None, // Default to 200 OK
        }
    }
}

impl ApiResponse<()> {
    /// `{success: true, message}` with 200
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            payload: Payload::Message(message.into()),
            status_code: None,
        }
    }

    /// `{success: true, message}` with 201 Created
    pub fn created(message: impl Into<String>) -> Self {
        Self {
            payload: Payload::Message(message.into()),
            status_code: Some(StatusCode::CREATED),
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = self.status_code.unwrap_or(StatusCode::OK);

        let envelope = match self.payload {
            Payload::Message(message) => json!({
                "success": true,
                "message": message
            }),
            Payload::Data(data) => {
                // Convert data to JSON Value for consistent envelope format
                let data_value: Value = match serde_json::to_value(&data) {
                    Ok(value) => value,
                    Err(e) => {
                        tracing::error!("Failed to serialize response data: {}", e);
                        return (
                            StatusCode::INTERNAL_SERVER_ERROR,
                            Json(json!({
                                "success": false,
                                "error": "Failed to serialize response data"
                            })),
                        )
                            .into_response();
                    }
                };
                json!({
                    "success": true,
                    "data": data_value
                })
            }
        };

        (status, Json(envelope)).into_response()
    }
}

// Convenience type aliases
pub type ApiResult<T> = Result<ApiResponse<T>, crate::error::ApiError>;
