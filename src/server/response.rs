//! Response envelope and error mapping for HTTP handlers

use crate::error::AppError;
use axum::{
    body::Bytes,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// Response body for every JSON endpoint
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the command succeeded
    pub success: bool,
    /// Result data (on success)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Error message (on failure)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Error type for handlers
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl From<AppError> for ApiError {
    fn from(e: AppError) -> Self {
        let status = match &e {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
            AppError::Parse(_) | AppError::Storage(_) | AppError::Template(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        if e.is_client_error() {
            log::debug!("Request rejected ({}): {}", e.kind(), e);
        } else {
            log::warn!("Request failed ({}): {}", e.kind(), e);
        }
        Self {
            status,
            message: e.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiResponse::<()> {
            success: false,
            data: None,
            error: Some(self.message),
        };
        (self.status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

/// Wrap a successful result in the envelope
pub fn ok<T: Serialize>(data: T) -> ApiResult<T> {
    Ok(Json(ApiResponse {
        success: true,
        data: Some(data),
        error: None,
    }))
}

/// Decode a JSON request body. An empty body decodes as `{}`.
pub fn parse_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, ApiError> {
    let raw: &[u8] = if body.iter().all(u8::is_ascii_whitespace) {
        b"{}"
    } else {
        body
    };
    serde_json::from_slice(raw).map_err(|e| ApiError::bad_request(format!("Invalid request body: {}", e)))
}

/// Extract a required argument from JSON args
pub fn get_arg<T: DeserializeOwned>(args: &Value, name: &str) -> Result<T, ApiError> {
    serde_json::from_value(
        args.get(name)
            .ok_or_else(|| ApiError::bad_request(format!("Missing argument: {}", name)))?
            .clone(),
    )
    .map_err(|e| ApiError::bad_request(format!("Invalid argument {}: {}", name, e)))
}

/// Extract an optional argument from JSON args
pub fn get_opt_arg<T: DeserializeOwned>(args: &Value, name: &str) -> Result<Option<T>, ApiError> {
    match args.get(name) {
        Some(v) if !v.is_null() => serde_json::from_value(v.clone())
            .map(Some)
            .map_err(|e| ApiError::bad_request(format!("Invalid argument {}: {}", name, e))),
        _ => Ok(None),
    }
}
