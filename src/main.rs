//! ChildWatch Server
//!
//! Daycare observation records with random forest risk prediction.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        CHILDWATCH                           │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌───────────┐  ┌───────────┐  ┌─────────────────────────┐ │
//! │  │  Pages    │  │  Session  │  │  Inference              │ │
//! │  │  (Axum)   │  │  (JWT     │  │  (Random forest bundle, │ │
//! │  │           │  │  cookie)  │  │   reference stats)      │ │
//! │  └─────┬─────┘  └─────┬─────┘  └────────────┬────────────┘ │
//! │        └──────────────┼──────────────────────┘              │
//! │                       ▼                                     │
//! │                ┌─────────────┐                             │
//! │                │ PostgreSQL  │                             │
//! │                └─────────────┘                             │
//! └─────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod db;
mod dataset;
mod forms;
mod handlers;
mod inference;
mod middleware;
mod models;
mod views;
mod error;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
    middleware as axum_middleware,
};
use tower_http::{
    trace::TraceLayer,
    compression::CompressionLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dataset::ReferenceStats;
use inference::ModelBundle;

pub use error::{AppError, AppResult};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env();

    // Initialize logging
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "childwatch=debug,tower_http=debug".into());
    if config.log_format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    tracing::info!("ChildWatch Server starting ({})...", config.environment);
    tracing::info!("Database: {}", config.database_url.split('@').last().unwrap_or("***"));

    // Load prediction artifacts
    let model = ModelBundle::load(&config.model_path)
        .with_context(|| format!("Failed to load model bundle {}", config.model_path.display()))?;
    let reference = ReferenceStats::load_or_empty(&config.reference_data_path);
    tracing::info!(
        "Reference data: {} children, {} with past reports",
        reference.total_kids,
        reference.danger_kids
    );

    // Initialize database pool
    let pool = db::create_pool(&config.database_url).await
        .context("Failed to create database pool")?;

    // Run migrations
    tracing::info!("Running database migrations...");
    db::run_migrations(&pool).await
        .context("Failed to run migrations")?;

    // Build application state
    let state = AppState {
        pool,
        config: config.clone(),
        model: Arc::new(model),
        reference: Arc::new(reference),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("🚀 Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await
        .context("Server error")?;

    Ok(())
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub pool: sqlx::PgPool,
    pub config: config::Config,
    pub model: Arc<ModelBundle>,
    pub reference: Arc<ReferenceStats>,
}

/// Create the main router with all routes
fn create_router(state: AppState) -> Router {
    // Observation pages
    let page_routes = Router::new()
        .route("/", get(handlers::dashboard::home).post(handlers::dashboard::submit))
        .route("/reset", post(handlers::dashboard::reset))
        .route("/predict", get(handlers::predict::show).post(handlers::predict::submit))
        .route("/single", get(handlers::predict::show))
        .route("/index", get(handlers::pages::index))
        .route("/bulk", get(handlers::upload::show));

    // CSV upload gets its own body limit
    let upload_routes = Router::new()
        .route("/upload", get(handlers::upload::show).post(handlers::upload::submit))
        .layer(DefaultBodyLimit::max(state.config.max_upload_bytes));

    // Account routes
    let auth_routes = Router::new()
        .route("/signup", post(handlers::auth::signup))
        .route("/login", post(handlers::auth::login))
        .route("/logout", get(handlers::auth::logout).post(handlers::auth::logout));

    // Combine all routes
    Router::new()
        .route("/health", get(handlers::health::check))
        .merge(page_routes)
        .merge(upload_routes)
        .merge(auth_routes)
        .fallback(not_found)
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::session::load_session,
        ))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn not_found() -> AppError {
    AppError::NotFound("페이지를 찾을 수 없습니다.".to_string())
}
