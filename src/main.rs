//! Balloon Extract Server
//!
//! HTTP service that turns an engineering drawing page into balloon-numbered
//! dimension records.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use balloon_extract::config::Config;
use balloon_extract::drawing::Pipeline;
use balloon_extract::ocr::{OcrProviderTrait, TesseractProvider};
use balloon_extract::raster::MupdfRasterizer;
use balloon_extract::routes;
use balloon_extract::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "balloon_extract=debug,tower_http=debug".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();

    let config = Config::from_env().context("Invalid configuration")?;

    tracing::info!("Starting Balloon Extract v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "OCR: {} ({}), {} dpi; correlation radius {}px",
        config.ocr.tesseract_path,
        config.ocr.default_language,
        config.pipeline.ocr_dpi,
        config.pipeline.correlation_radius_px
    );

    let ocr = Arc::new(TesseractProvider::new(config.ocr.clone()));
    if !ocr.is_available().await {
        tracing::warn!(
            "Tesseract not found at '{}'; every page will report a recognition error",
            config.ocr.tesseract_path
        );
    }

    let pipeline = Pipeline::new(config.pipeline.clone(), Arc::new(MupdfRasterizer::new()), ocr);
    let app_state = AppState::new(config.clone(), pipeline);
    let app = routes::app(app_state);

    // Start server with graceful shutdown
    let host: std::net::IpAddr = config
        .server
        .host
        .parse()
        .with_context(|| format!("Invalid SERVER_HOST '{}'", config.server.host))?;
    let addr = SocketAddr::new(host, config.server.port);
    tracing::info!("Balloon Extract listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown...");
        },
    }
}
