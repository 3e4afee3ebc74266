//! Route modules for the PDF Extraction API

pub mod extract;
pub mod health;

use axum::{extract::DefaultBodyLimit, routing::get, Router};
use tower_http::services::{ServeDir, ServeFile};

use crate::payment::PaymentGate;
use crate::state::AppState;

/// Build the application router
///
/// Layers shared by every route (tracing, CORS) are added by the caller.
pub fn router(state: AppState, gate: PaymentGate) -> Router {
    let static_dir = state.config().server.static_dir.clone();
    let upload_limit = state.config().extraction.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_check))
        .merge(extract::router(gate))
        .route_service("/", ServeFile::new(static_dir.join("index.html")))
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(DefaultBodyLimit::max(upload_limit))
        .with_state(state)
}
