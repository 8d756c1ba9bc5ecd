//! Equirent Server - construction equipment rental marketplace
//!
//! REST API server for equipment listings, rentals and account verification.

use anyhow::Context;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use equirent_server::{
    api,
    config::{AppConfig, LoggingConfig},
    repository::Repository,
    services::{redis::RedisService, storage::LocalDocumentStorage, Services},
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;

    // Held until shutdown so buffered log lines are flushed
    let _log_guard = init_tracing(&config.logging);

    tracing::info!("Starting Equirent Server v{}", env!("CARGO_PKG_VERSION"));

    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .connect(&config.database.url)
        .await
        .context("Failed to connect to database")?;

    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;

    tracing::info!("Database migrations completed");

    let redis_service = RedisService::new(&config.redis.url)
        .await
        .context("Failed to connect to Redis")?;

    tracing::info!("Connected to Redis");

    let storage = Arc::new(LocalDocumentStorage::new(&config.storage.upload_dir));
    tracing::info!(upload_dir = %config.storage.upload_dir, "Document storage ready");

    let repository = Repository::new(pool);
    let services = Services::new(
        repository,
        config.auth.clone(),
        &config.storage,
        redis_service,
        storage,
    );

    let addr = SocketAddr::new(
        config.server.host.parse().context("Invalid host address")?,
        config.server.port,
    );

    let state = AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    };

    let app = create_router(state)?;

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    // Peer addresses are needed by the rate limiter
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await?;

    Ok(())
}

/// Console output in pretty or JSON format, plus an optional daily log file
fn init_tracing(config: &LoggingConfig) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("equirent_server={},tower_http=debug", config.level).into());

    let json = config.format.eq_ignore_ascii_case("json");

    let (file_layer, guard) = match config.directory {
        Some(ref directory) => {
            let appender = tracing_appender::rolling::daily(directory, "equirent.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().json().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| fmt::layer().json()))
        .with((!json).then(|| fmt::layer()))
        .with(file_layer)
        .init();

    guard
}

/// Create the application router with all routes
fn create_router(state: AppState) -> anyhow::Result<Router> {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Per-IP throttling of credential endpoints
    let governor_conf = GovernorConfigBuilder::default()
        .per_second(state.config.rate_limit.per_second)
        .burst_size(state.config.rate_limit.burst_size)
        .finish()
        .context("Invalid rate limit configuration")?;
    let governor = GovernorLayer {
        config: Box::leak(Box::new(governor_conf)),
    };

    let auth_routes = Router::new()
        .route("/auth/register", post(api::auth::register))
        .route("/auth/login", post(api::auth::login))
        .layer(governor);

    // Multipart uploads need headroom above the file itself
    let body_limit = state.config.storage.max_upload_bytes + 64 * 1024;

    let api_v1 = Router::new()
        // Health check
        .route("/health", get(api::health::health_check))
        .route("/ready", get(api::health::readiness_check))
        // Authentication
        .merge(auth_routes)
        .route("/auth/logout", post(api::auth::logout))
        .route("/auth/me", get(api::auth::me))
        .route("/auth/profile", put(api::auth::update_profile))
        // Users
        .route("/users", get(api::users::list_users))
        .route(
            "/users/:id",
            get(api::users::get_user).delete(api::users::delete_user),
        )
        .route("/users/:id/role", put(api::users::update_role))
        .route("/users/:id/status", put(api::users::update_status))
        .route(
            "/users/:id/verification/documents",
            get(api::verification::list_documents),
        )
        .route(
            "/users/:id/verification/history",
            get(api::verification::verification_history),
        )
        // Equipment
        .route(
            "/equipment",
            get(api::equipment::list_equipment).post(api::equipment::create_equipment),
        )
        .route(
            "/equipment/:id",
            get(api::equipment::get_equipment)
                .put(api::equipment::update_equipment)
                .delete(api::equipment::delete_equipment),
        )
        .route(
            "/equipment/:id/maintenance",
            get(api::equipment::list_maintenance).post(api::equipment::add_maintenance),
        )
        .route(
            "/equipment/:id/availability",
            get(api::availability::get_availability).put(api::availability::replace_availability),
        )
        .route(
            "/equipment/:id/rentals",
            get(api::rentals::list_equipment_rentals),
        )
        .route(
            "/equipment/:id/ratings",
            get(api::ratings::list_ratings).post(api::ratings::create_rating),
        )
        .route(
            "/equipment/:id/ratings/summary",
            get(api::ratings::rating_summary),
        )
        // Rentals
        .route(
            "/rentals",
            get(api::rentals::list_rentals).post(api::rentals::create_rental),
        )
        .route(
            "/rentals/:id",
            get(api::rentals::get_rental).delete(api::rentals::delete_rental),
        )
        .route("/rentals/:id/status", put(api::rentals::update_rental_status))
        // Verification
        .route(
            "/verification/documents",
            post(api::verification::upload_document),
        )
        .route(
            "/verification/documents/:id/content",
            get(api::verification::download_document),
        )
        .route(
            "/verification/documents/:id/review",
            put(api::verification::review_document),
        )
        // Notifications
        .route("/notifications", get(api::notifications::list_notifications))
        .route("/notifications/read-all", put(api::notifications::mark_all_read))
        .route("/notifications/:id/read", put(api::notifications::mark_read))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state);

    let openapi = api::openapi::create_openapi_router();

    Ok(Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors))
}
