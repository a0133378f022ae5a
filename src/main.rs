use anyhow::Context;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use pdfchat_backend::config::AppConfig;
use pdfchat_backend::db::{connection, migrations};
use pdfchat_backend::routes;
use pdfchat_backend::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;
    tracing::info!("Configuration loaded (env: {})", std::env::var("RUN_ENV").unwrap_or_else(|_| "development".into()));

    let chunk_options = config
        .chunking
        .resolve()
        .context("Invalid chunking configuration")?;
    tracing::info!(
        "Chunking with chunk_size={} overlap={}",
        chunk_options.chunk_size,
        chunk_options.overlap
    );

    let db_pool = connection::create_pool(&config.database)
        .await
        .context("Failed to create database pool")?;
    migrations::run_all(&db_pool)
        .await
        .context("Failed to run migrations")?;

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState::new(config, chunk_options, db_pool);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = routes::router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(cors),
    );

    tracing::info!("Starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .await
        .context("Server error")?;

    Ok(())
}
