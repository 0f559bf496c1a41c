//! Labtrack Server - Laboratory Equipment Borrowing System

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use labtrack_server::{
    api,
    config::AppConfig,
    services::{notify::EmailSink, Services},
    store::{PgStore, Store},
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load().expect("Failed to load configuration");

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("labtrack_server={},tower_http=debug", config.logging.level).into()
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Labtrack Server v{}", env!("CARGO_PKG_VERSION"));

    // Create database connection pool
    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .connect(&config.database.url)
        .await
        .expect("Failed to connect to database");

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run database migrations");

    tracing::info!("Database migrations completed");

    // Save server address before moving config
    let server_host = config.server.host.clone();
    let server_port = config.server.port;
    let sweeper_config = config.sweeper.clone();

    // Create store and services
    let store: Arc<dyn Store> = Arc::new(PgStore::new(pool));
    let sink = Arc::new(EmailSink::new(config.email.clone()));
    let services = Arc::new(Services::new(
        store.clone(),
        sink,
        config.fines.clone(),
    ));

    // Schedule the reconciliation sweeper
    let sweeper = services.reconciliation.clone();
    tokio::spawn(sweeper.run(
        sweeper_config.interval_minutes,
        sweeper_config.run_at_startup,
    ));

    // Create application state
    let state = AppState {
        config: Arc::new(config),
        store,
        services,
    };

    // Build router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(
        server_host.parse().expect("Invalid host address"),
        server_port,
    );

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes
fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // API v1 routes
    let api_v1 = Router::new()
        // Health check
        .route("/health", get(api::health::health_check))
        .route("/ready", get(api::health::readiness_check))
        // Equipment
        .route("/equipment", get(api::equipment::list_equipment))
        .route("/equipment", post(api::equipment::create_equipment))
        .route("/equipment/:id", get(api::equipment::get_equipment))
        .route("/equipment/:id", put(api::equipment::update_equipment))
        .route("/equipment/:id", delete(api::equipment::delete_equipment))
        // Transactions
        .route("/transactions", get(api::transactions::list_transactions))
        .route("/transactions", post(api::transactions::create_transaction))
        .route("/transactions/sweep", post(api::transactions::sweep_transactions))
        .route("/transactions/:id", get(api::transactions::get_transaction))
        .route("/transactions/:id", delete(api::transactions::delete_transaction))
        .route("/transactions/:id/approve", post(api::transactions::approve_transaction))
        .route("/transactions/:id/deny", post(api::transactions::deny_transaction))
        .route("/transactions/:id/complete", post(api::transactions::complete_transaction))
        .route("/students/:id/transactions", get(api::transactions::get_student_transactions))
        // Archive
        .route("/records", get(api::records::list_records))
        .route("/fines", get(api::records::list_fines))
        .with_state(state);

    // OpenAPI documentation
    let openapi = api::openapi::create_openapi_router();

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
