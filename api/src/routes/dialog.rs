use axum::extract::State;
use axum::{Json, Router, routing::post};
use fitfriend_core::dialog::{TurnRequest, TurnResponse};
use fitfriend_core::error::ApiError;

use crate::engine;
use crate::error::AppError;
use crate::extract::AppJson;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/v1/dialog/turn", post(handle_turn))
}

/// Handle one dialog turn
///
/// Called by the dialog platform once per turn, both while it is collecting
/// slots (`pre_commit`) and when it has decided to fulfill (`post_commit`).
/// The returned `session_state` must be sent back verbatim on the next turn.
#[utoipa::path(
    post,
    path = "/v1/dialog/turn",
    request_body = TurnRequest,
    responses(
        (status = 200, description = "Directive for the platform", body = TurnResponse),
        (status = 400, description = "Malformed turn", body = ApiError),
        (status = 500, description = "Intent not handled by this service", body = ApiError),
        (status = 503, description = "Store unavailable", body = ApiError)
    ),
    tag = "dialog"
)]
pub async fn handle_turn(
    State(state): State<AppState>,
    AppJson(request): AppJson<TurnRequest>,
) -> Result<Json<TurnResponse>, AppError> {
    if request.user_id.trim().is_empty() {
        return Err(AppError::Validation {
            message: "user_id must not be empty".to_string(),
            field: Some("user_id".to_string()),
            received: Some(serde_json::Value::String(request.user_id)),
            docs_hint: None,
        });
    }

    let response = engine::handle_turn(&state, request).await?;
    Ok(Json(response))
}

#[cfg(test)]
mod tests {
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use crate::engine::testing::Harness;

    async fn post_turn(harness: &Harness, body: Value) -> (StatusCode, Value) {
        let app = crate::routes::router().with_state(harness.state.clone());
        let response = app
            .oneshot(
                Request::post("/v1/dialog/turn")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn help_turn_returns_a_terminal_directive() {
        let harness = Harness::with_user().await;
        let (status, body) = post_turn(
            &harness,
            json!({"user_id": "u1", "intent": "Help", "invocation_phase": "FulfillmentCodeHook"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["directive"]["type"], "terminal");
        assert_eq!(body["session_state"]["version"], 1);
    }

    #[tokio::test]
    async fn unknown_intent_is_a_server_fault() {
        let harness = Harness::with_user().await;
        let (status, body) = post_turn(
            &harness,
            json!({"user_id": "u1", "intent": "OrderFlowers", "invocation_phase": "pre_commit"}),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "unhandled_intent");
    }

    #[tokio::test]
    async fn malformed_body_is_rejected() {
        let harness = Harness::with_user().await;
        let (status, body) = post_turn(&harness, json!({"intent": "Help"})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "validation_failed");
    }
}
