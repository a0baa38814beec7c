use serde::Serialize;
use utoipa::ToSchema;

/// Structured error response returned to the dialog platform or an operator.
/// End users never see these: recoverable conditions become directives, so
/// anything that reaches this type is a configuration or infrastructure fault.
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiError {
    /// Machine-readable error code (e.g. "validation_failed", "unhandled_intent")
    pub error: String,
    /// Human-readable description of what went wrong
    pub message: String,
    /// Which request field caused the error (if applicable)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    /// The value that was received (if applicable)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub received: Option<serde_json::Value>,
    /// Request ID for tracing and debugging
    pub request_id: String,
    /// Hint about what the correct usage looks like
    #[serde(skip_serializing_if = "Option::is_none")]
    pub docs_hint: Option<String>,
}

/// Error codes used across the API
pub mod codes {
    pub const VALIDATION_FAILED: &str = "validation_failed";
    pub const UNHANDLED_INTENT: &str = "unhandled_intent";
    pub const STORE_UNAVAILABLE: &str = "store_unavailable";
}
