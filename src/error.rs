use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    Unauthorized(String),
    BadRequest(String),
    Internal(String),
    Timeout(String),
}

impl AppError {
    /// The uniform rejection for a malformed or disallowed endpoint payload.
    pub fn bad_body() -> Self {
        AppError::BadRequest("Bad request body".to_string())
    }

    pub fn endpoint_not_found() -> Self {
        AppError::NotFound("Endpoint does not exist".to_string())
    }

    pub fn invalid_token() -> Self {
        AppError::Unauthorized("Invalid token".to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::NotFound(msg) => write!(f, "Not Found: {msg}"),
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {msg}"),
            AppError::BadRequest(msg) => write!(f, "Bad Request: {msg}"),
            AppError::Internal(msg) => write!(f, "Internal Error: {msg}"),
            AppError::Timeout(msg) => write!(f, "Timeout: {msg}"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal error occurred".to_string(),
                )
            }
            AppError::Timeout(msg) => {
                tracing::error!("Timed out: {msg}");
                (
                    StatusCode::GATEWAY_TIMEOUT,
                    "Upstream timed out".to_string(),
                )
            }
        };

        let body = json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}
