//! PDF Extraction API server
//!
//! Extracts text from uploaded PDFs, with a paid full endpoint guarded by
//! x402 micropayments and a free endpoint limited to the first pages.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pdf_extract_api::config::Config;
use pdf_extract_api::mupdf::MupdfEngine;
use pdf_extract_api::ocr::OcrService;
use pdf_extract_api::payment::{FacilitatorClient, PaymentGate};
use pdf_extract_api::routes;
use pdf_extract_api::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pdf_extract_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();

    // Payment routing comes from here, so a bad value must stop startup
    let config = Config::from_env().context("Failed to load config from env")?;

    tracing::info!("Starting PDF Extraction API v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "x402: {} atomic USDC on {} to {} via {}",
        config.payment.price_atomic,
        config.payment.network.as_str(),
        config.payment.pay_to,
        config.payment.facilitator_url
    );
    tracing::info!("OCR mode: {}", config.extraction.ocr_mode);

    // Probe OCR providers once up front; the result is reused for every page
    let ocr = Arc::new(OcrService::new(config.ocr.clone()));
    let available = tokio::task::spawn_blocking({
        let ocr = Arc::clone(&ocr);
        move || ocr.available_providers()
    })
    .await
    .context("OCR provider probe failed")?;
    if available.is_empty() {
        tracing::warn!("No OCR provider available; OCR pages will fail");
    } else {
        tracing::info!("OCR providers available: {:?}", available);
    }

    let engine = Arc::new(MupdfEngine::new(ocr));
    let verifier = Arc::new(FacilitatorClient::new(&config.payment.facilitator_url));
    let gate = PaymentGate::new(config.payment.clone(), verifier);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .with_context(|| format!("Invalid listen address {}", config.server.host))?;

    let app_state = AppState::new(config, engine);

    // Build CORS layer
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = routes::router(app_state, gate)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server with graceful shutdown
    tracing::info!("PDF Extraction API listening on {}", addr);

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
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
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
