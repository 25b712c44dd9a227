use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::error;

use skillswap_db::StoreError;

/// Application-level error mapped onto the HTTP taxonomy. Validation errors
/// carry field-level messages and render as `{"field": ["message", ...]}`;
/// everything else renders as `{"detail": "..."}`.
#[derive(Debug)]
pub enum ApiError {
    Validation(Vec<(&'static str, String)>),
    /// Non-field input error, 400.
    Invalid(String),
    /// Missing or invalid credentials/token, 401.
    Auth(String),
    /// Authenticated but not allowed, 403.
    Permission(String),
    NotFound(String),
    Conflict(String),
    Internal(String),
}

impl ApiError {
    pub fn field(field: &'static str, message: impl Into<String>) -> Self {
        ApiError::Validation(vec![(field, message.into())])
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound => ApiError::NotFound("Not found".into()),
            StoreError::Conflict(msg) => ApiError::Conflict(msg),
            StoreError::Invalid(msg) => ApiError::Invalid(msg),
            StoreError::Forbidden(msg) => ApiError::Permission(msg),
            StoreError::Poisoned | StoreError::Sqlite(_) => ApiError::Internal(e.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(fields) => {
                let mut body = serde_json::Map::new();
                for (field, message) in fields {
                    let messages = body.entry(field).or_insert_with(|| json!([]));
                    if let Some(messages) = messages.as_array_mut() {
                        messages.push(json!(message));
                    }
                }
                (StatusCode::BAD_REQUEST, Json(serde_json::Value::Object(body))).into_response()
            }
            ApiError::Invalid(msg) => detail(StatusCode::BAD_REQUEST, &msg),
            ApiError::Auth(msg) => detail(StatusCode::UNAUTHORIZED, &msg),
            ApiError::Permission(msg) => detail(StatusCode::FORBIDDEN, &msg),
            ApiError::NotFound(msg) => detail(StatusCode::NOT_FOUND, &msg),
            ApiError::Conflict(msg) => detail(StatusCode::CONFLICT, &msg),
            ApiError::Internal(msg) => {
                error!("internal error: {msg}");
                detail(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        }
    }
}

fn detail(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "detail": message }))).into_response()
}
