// HTTP API Error Types
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::{json, Value};

use crate::database::DatabaseError;

/// HTTP API error rendered into the `{success: false, error, message}` envelope
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    Validation { error: String, message: String },

    // 404 Not Found
    NotFound(String),

    // 500 Internal Server Error
    Internal { error: String, message: String },
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::Validation { .. } => 400,
            ApiError::NotFound(_) => 404,
            ApiError::Internal { .. } => 500,
        }
    }

    /// Short summary placed in `error`
    pub fn error(&self) -> &str {
        match self {
            ApiError::Validation { error, .. } => error,
            ApiError::NotFound(error) => error,
            ApiError::Internal { error, .. } => error,
        }
    }

    /// Detail placed in `message`, when there is one
    pub fn message(&self) -> Option<&str> {
        match self {
            ApiError::Validation { message, .. } => Some(message),
            ApiError::NotFound(_) => None,
            ApiError::Internal { message, .. } => Some(message),
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        let mut body = json!({
            "success": false,
            "error": self.error(),
        });
        if let Some(message) = self.message() {
            body["message"] = json!(message);
        }
        body
    }
}

impl ApiError {
    pub fn bad_request(error: impl Into<String>, message: impl Into<String>) -> Self {
        ApiError::Validation {
            error: error.into(),
            message: message.into(),
        }
    }

    pub fn missing_fields(message: impl Into<String>) -> Self {
        Self::bad_request("Missing required fields", message)
    }

    pub fn not_found(error: impl Into<String>) -> Self {
        ApiError::NotFound(error.into())
    }

    pub fn internal(error: impl Into<String>, message: impl Into<String>) -> Self {
        ApiError::Internal {
            error: error.into(),
            message: message.into(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::bad_request("Invalid request body", rejection.body_text())
    }
}

/// Maps gateway failures to a 500 carrying the driver's message
pub trait ResultExt<T> {
    fn or_internal(self, error: &str) -> Result<T, ApiError>;
}

impl<T> ResultExt<T> for Result<T, DatabaseError> {
    fn or_internal(self, error: &str) -> Result<T, ApiError> {
        self.map_err(|e| {
            tracing::error!("{}: {}", error, e);
            ApiError::internal(error, e.to_string())
        })
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.message() {
            Some(message) => write!(f, "{}: {}", self.error(), message),
            None => write!(f, "{}", self.error()),
        }
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        if let ApiError::Validation { .. } = self {
            tracing::warn!("Rejected request: {}", self);
        }
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_json())).into_response()
    }
}
