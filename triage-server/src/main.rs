//! triage-server binary entry point.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::http::{header, HeaderValue, Method};
use clap::Parser;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use triage_server::config::{CliArgs, Config};
use triage_server::services::ClassificationService;
use triage_server::{build_router, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = CliArgs::parse();
    let config = Config::resolve(args)?;

    info!("Starting triage-server (audio emotion triage)");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));
    info!("Model: {}", config.model_path.display());

    // One-shot model load; a failure leaves the service answering with
    // diagnostics instead of refusing to start.
    let classifier = Arc::new(ClassificationService::start(
        &config.model_path,
        &config.labels_path,
    ));

    let state = AppState::new(classifier);

    let cors = CorsLayer::new()
        .allow_origin(
            config
                .allowed_origin
                .parse::<HeaderValue>()
                .with_context(|| format!("invalid allowed origin: {}", config.allowed_origin))?,
        )
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    let app = build_router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port))
        .await
        .with_context(|| format!("failed to bind port {}", config.port))?;
    info!("Listening on http://0.0.0.0:{}", config.port);
    info!("Health check: http://127.0.0.1:{}/health", config.port);

    axum::serve(listener, app).await?;

    Ok(())
}
