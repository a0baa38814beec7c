use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use serde::Serialize;
use sqlx::postgres::PgPoolOptions;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod clock;
mod config;
mod engine;
mod error;
mod extract;
mod routes;
mod state;
mod store;

use crate::clock::{Calendar, SystemClock};
use crate::config::AppConfig;
use crate::store::{MemoryStore, PgStore, Store};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "FitFriend API",
        version = "0.1.0",
        description = "Dialog backend for a conversational fitness tracker: \
                       workouts, meals, and the excuses in between."
    ),
    paths(
        routes::health::health_check,
        routes::dialog::handle_turn,
    ),
    components(schemas(
        HealthResponse,
        fitfriend_core::error::ApiError,
        fitfriend_core::dialog::TurnRequest,
        fitfriend_core::dialog::TurnResponse,
        fitfriend_core::dialog::Directive,
        fitfriend_core::dialog::Slots,
        fitfriend_core::dialog::IntentName,
        fitfriend_core::dialog::InvocationPhase,
        fitfriend_core::dialog::ConfirmationStatus,
        fitfriend_core::dialog::FulfillmentState,
        fitfriend_core::session::SessionState,
        fitfriend_core::session::Continuation,
        fitfriend_core::session::ResumeReason,
        fitfriend_core::session::MealEstimate,
        fitfriend_core::catalog::CatalogKind,
        fitfriend_core::ledger::NutrientTotals,
    )),
    tags(
        (name = "dialog", description = "Turn handling for the dialog platform"),
        (name = "system", description = "Health and metadata")
    )
)]
struct ApiDoc;

#[derive(Serialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[tokio::main]
async fn main() {
    // Load .env if present (dev only)
    let _ = dotenvy::dotenv();

    // Structured JSON logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fitfriend_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    let config = AppConfig::from_env().expect("Invalid configuration");

    let store: Arc<dyn Store> = match &config.database_url {
        Some(database_url) => {
            let pool = PgPoolOptions::new()
                .max_connections(config.database_max_connections)
                .connect(database_url)
                .await
                .expect("Failed to connect to database");

            sqlx::migrate!("../migrations")
                .run(&pool)
                .await
                .expect("Failed to run migrations");

            Arc::new(PgStore::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set; using the in-memory store, nothing will persist");
            Arc::new(MemoryStore::new())
        }
    };

    let seeded = store::seed_universal_catalog(store.as_ref())
        .await
        .expect("Failed to seed the universal exercise catalog");
    tracing::info!(seeded, "Universal exercise catalog ready");

    let app_state = state::AppState {
        store,
        calendar: Calendar::new(config.timezone, Arc::new(SystemClock)),
    };

    let app = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .merge(routes::router())
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!(timezone = %config.timezone, "FitFriend API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
