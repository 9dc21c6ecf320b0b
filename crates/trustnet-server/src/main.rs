#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

mod api;
mod config;

use anyhow::Context;
use axum::http::{Method, header};
use config::ServerConfig;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use trustnet_core::AppCore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,trustnet_server=debug,trustnet_core=debug".into()),
        )
        .with_target(false)
        .with_thread_ids(true)
        .with_line_number(true)
        .init();

    tracing::info!("Starting TrustNet server");

    let config = ServerConfig::load().context("Failed to load server configuration")?;
    let db_path = config
        .resolve_database_path()
        .context("Failed to determine TrustNet database path")?;
    let core = Arc::new(
        AppCore::with_scoring(&db_path, config.scoring.clone())
            .await
            .context("Failed to initialize app core")?,
    );

    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    let app = api::router(core)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind to {address}"))?;

    tracing::info!(database = %db_path, "TrustNet running on http://{address}");

    axum::serve(listener, app)
        .await
        .context("Failed to start server")?;
    Ok(())
}
