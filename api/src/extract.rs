//! JSON extractor whose rejections are structured `AppError`s rather than
//! axum's plain-text 422.

use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
};

use crate::error::AppError;

/// Drop-in replacement for `axum::Json<T>` in handler arguments.
pub struct AppJson<T>(pub T);

impl<S, T> FromRequest<S> for AppJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(AppJson(value)),
            Err(rejection) => Err(map_json_rejection(rejection)),
        }
    }
}

pub fn map_json_rejection(rejection: JsonRejection) -> AppError {
    let body_text = rejection.body_text();
    AppError::Validation {
        field: Some(field_from_serde_message(&body_text).unwrap_or_else(|| "body".to_string())),
        message: format!("Invalid turn: {body_text}"),
        received: None,
        docs_hint: Some("See the TurnRequest schema at /api-doc/openapi.json.".to_string()),
    }
}

/// Field named by serde's "missing field `x`" / "unknown field `x`" /
/// "unknown variant `x`" messages.
fn field_from_serde_message(msg: &str) -> Option<String> {
    ["missing field `", "unknown field `", "unknown variant `"]
        .iter()
        .find_map(|pattern| {
            let after = &msg[msg.find(pattern)? + pattern.len()..];
            after.find('`').map(|end| after[..end].to_string())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_the_missing_field() {
        let msg =
            "Failed to deserialize the JSON body: missing field `user_id` at line 1 column 40";
        assert_eq!(field_from_serde_message(msg), Some("user_id".to_string()));
    }

    #[test]
    fn names_the_bad_variant() {
        let msg = "unknown variant `Maybe`, expected one of `None`, `Confirmed`, `Denied`";
        assert_eq!(field_from_serde_message(msg), Some("Maybe".to_string()));
    }

    #[test]
    fn generic_errors_have_no_field() {
        assert_eq!(field_from_serde_message("expected value at line 1 column 1"), None);
    }
}
