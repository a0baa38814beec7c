pub mod dialog;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// All API routes, without the documentation and tracing layers.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(dialog::router())
}
