// ABOUTME: HTTP server startup for `reqflow serve`
// ABOUTME: Applies CORS and request tracing around the API router and serves until Ctrl-C

use std::net::SocketAddr;

use axum::http::{HeaderValue, Method};
use axum::Router;
use reqflow_api::{create_router, AppState};
use reqflow_config::Config;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

/// The API router with the server-level layers applied
pub fn build_app(state: AppState, cors_origin: &str) -> anyhow::Result<Router> {
    let cors = CorsLayer::new()
        .allow_origin(cors_origin.parse::<HeaderValue>()?)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);

    Ok(create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors))
}

pub async fn run_server(config: Config) -> anyhow::Result<()> {
    let state = AppState::from_config(&config).await?;
    let app = build_app(state, &config.cors_origin)?;

    let addr = SocketAddr::from(([127, 0, 0, 1], config.port));
    info!("Server listening on {} (CORS origin: {})", addr, config.cors_origin);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        // No signal handler; run until the process is killed
        std::future::pending::<()>().await;
    }
}
