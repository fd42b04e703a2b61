//! services/kiosk/src/bin/kiosk.rs

use attendance_core::ports::{AttendanceService, Clock, LocalClock};
use attendance_core::roster::Roster;
use axum::{
    http::{header::CONTENT_TYPE, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use kiosk_lib::{
    adapters::{DbAdapter, LocalScriptHost},
    config::Config,
    error::KioskError,
    web::{
        attendance_for_date_handler, list_roster_handler, record_attendance_handler,
        rest::ApiDoc, state::AppState, today_attendance_handler, ws_handler,
    },
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), KioskError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Load the Roster ---
    let roster = Arc::new(match &config.roster_path {
        Some(path) => {
            let text = tokio::fs::read_to_string(path).await?;
            let roster = Roster::from_lines(&text);
            if roster.is_empty() {
                return Err(KioskError::Internal(format!(
                    "The roster file {} lists no members",
                    path.display()
                )));
            }
            info!("Loaded {} members from {}.", roster.len(), path.display());
            roster
        }
        None => {
            let roster = Roster::default();
            info!("Using the built-in roster of {} members.", roster.len());
            roster
        }
    });
    let clock: Arc<dyn Clock> = Arc::new(LocalClock);

    // --- 3. Connect to Database & Run Migrations ---
    info!("Connecting to database...");
    let db_pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;
    let db_adapter = Arc::new(DbAdapter::new(db_pool, roster.clone(), clock.clone()));
    info!("Running database migrations...");
    db_adapter.run_migrations().await?;
    info!("Database migrations complete.");

    // --- 4. Build the Shared AppState ---
    let service: Arc<dyn AttendanceService> = db_adapter;
    let app_state = Arc::new(AppState {
        service: service.clone(),
        host: Arc::new(LocalScriptHost::new(service)),
        config: config.clone(),
        roster,
        clock,
    });

    let origin = config.cors_origin.parse::<HeaderValue>().map_err(|e| {
        KioskError::Internal(format!("Invalid CORS origin '{}': {}", config.cors_origin, e))
    })?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE]);

    // --- 5. Create the Web Router ---
    let api_router = Router::new()
        .route("/ws", get(ws_handler))
        .route("/attendance", post(record_attendance_handler))
        .route("/attendance/today", get(today_attendance_handler))
        .route("/attendance/{date}", get(attendance_for_date_handler))
        .route("/roster", get(list_roster_handler))
        .layer(cors)
        .with_state(app_state);

    // Merge the API router with the Swagger UI router for a complete application.
    let app = Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 6. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
