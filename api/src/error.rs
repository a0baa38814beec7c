use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use fitfriend_core::error::{self, ApiError};

use crate::store::StoreError;

/// Internal error type that converts to structured API responses
#[derive(Debug)]
pub enum AppError {
    /// Malformed request body (400)
    Validation {
        message: String,
        field: Option<String>,
        received: Option<serde_json::Value>,
        docs_hint: Option<String>,
    },
    /// Intent name this service has no handler for (500). A platform
    /// configuration fault, not a user-facing condition.
    UnhandledIntent(String),
    /// Store could not serve the turn (503)
    Store(StoreError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let request_id = uuid::Uuid::now_v7().to_string();

        let (status, api_error) = match self {
            AppError::Validation {
                message,
                field,
                received,
                docs_hint,
            } => (
                StatusCode::BAD_REQUEST,
                ApiError {
                    error: error::codes::VALIDATION_FAILED.to_string(),
                    message,
                    field,
                    received,
                    request_id,
                    docs_hint,
                },
            ),
            AppError::UnhandledIntent(intent) => {
                tracing::error!(intent = %intent, request_id = %request_id, "Unhandled intent");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiError {
                        error: error::codes::UNHANDLED_INTENT.to_string(),
                        message: format!("Intent '{intent}' is not handled by this service"),
                        field: Some("intent".to_string()),
                        received: Some(serde_json::Value::String(intent)),
                        request_id,
                        docs_hint: Some(
                            "Check the dialog platform's intent configuration \
                             against GET /api-doc/openapi.json."
                                .to_string(),
                        ),
                    },
                )
            }
            AppError::Store(err) => {
                tracing::error!("Store error: {:?}", err);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    ApiError {
                        error: error::codes::STORE_UNAVAILABLE.to_string(),
                        message: "The data store is unavailable".to_string(),
                        field: None,
                        received: None,
                        request_id,
                        docs_hint: None,
                    },
                )
            }
        };

        (status, Json(api_error)).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::Store(err)
    }
}
