//! Text extraction routes
//!
//! `POST /extract` is the paid full extraction and sits behind the payment
//! gate. `POST /test/extract` is free and capped at [`FREE_TIER_PAGE_CAP`]
//! pages. Both take a multipart upload with the PDF in a field named `file`.

use std::time::Duration;

use axum::{
    body::Bytes,
    extract::{Multipart, State},
    middleware::from_fn_with_state,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;

use crate::document::{is_pdf_filename, DocumentError, ExtractionOptions, ExtractionResult};
use crate::error::{AppError, Result};
use crate::extraction::{extract_text, FREE_TIER_PAGE_CAP};
use crate::payment::{require_payment, PaymentGate};
use crate::state::AppState;

/// Create the extract router
///
/// The payment layer only covers `/extract`; routes added after
/// `route_layer` are not wrapped.
pub fn router(gate: PaymentGate) -> Router<AppState> {
    Router::new()
        .route("/extract", post(extract))
        .route_layer(from_fn_with_state(gate, require_payment))
        .route("/test/extract", get(test_extract_info).post(test_extract))
}

/// Usage notes for the free endpoint
#[derive(Debug, Serialize)]
pub struct TestEndpointInfo {
    pub endpoint: &'static str,
    pub description: String,
    pub usage: &'static str,
}

/// A PDF pulled out of a multipart body
struct Upload {
    filename: String,
    data: Bytes,
}

/// Full extraction of every page
async fn extract(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<ExtractionResult>> {
    let upload = read_upload(multipart).await?;
    let options = ExtractionOptions::full(state.config().extraction.ocr_mode);

    run_extraction(&state, upload, options).await.map(Json)
}

async fn test_extract_info() -> Json<TestEndpointInfo> {
    Json(TestEndpointInfo {
        endpoint: "POST /test/extract",
        description: format!(
            "Upload a PDF to extract text (first {} pages only, for testing)",
            FREE_TIER_PAGE_CAP
        ),
        usage: "curl -X POST -F 'file=@document.pdf' https://your-api/test/extract",
    })
}

/// Free extraction of the first few pages
async fn test_extract(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<ExtractionResult>> {
    let upload = read_upload(multipart).await?;
    let options = ExtractionOptions::trial(FREE_TIER_PAGE_CAP, state.config().extraction.ocr_mode);

    run_extraction(&state, upload, options).await.map(Json)
}

/// Find the upload field and read it, rejecting non-PDF names before the
/// body is pulled off the wire
async fn read_upload(mut multipart: Multipart) -> Result<Upload> {
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        tracing::error!("Failed to read multipart field: {}", e);
        AppError::InvalidInput(format!("Failed to read upload: {}", e))
    })? {
        let name = field.name().unwrap_or("").to_string();
        if name != "file" && name != "pdf" {
            tracing::debug!("Skipping multipart field '{}'", name);
            continue;
        }

        let filename = field.file_name().unwrap_or("").to_string();
        if !is_pdf_filename(&filename) {
            return Err(AppError::InvalidInput("File must be a PDF".to_string()));
        }

        let data = field.bytes().await.map_err(|e| {
            tracing::error!("Failed to read file data: {}", e);
            AppError::Internal(format!("Failed to read file data: {}", e))
        })?;

        tracing::debug!("Read {} bytes from '{}'", data.len(), filename);
        return Ok(Upload { filename, data });
    }

    tracing::warn!("No file field found in multipart upload");
    Err(AppError::InvalidInput(
        "No file provided. Use field name 'file'".to_string(),
    ))
}

/// Run the extraction on the blocking pool, bounded by the configured timeout
async fn run_extraction(
    state: &AppState,
    upload: Upload,
    options: ExtractionOptions,
) -> Result<ExtractionResult> {
    let Upload { filename, data } = upload;
    let timeout_secs = state.config().extraction.timeout_secs;
    let engine = state.engine();

    tracing::info!(
        filename = %filename,
        bytes = data.len(),
        max_pages = ?options.max_pages,
        ocr_mode = %options.ocr_mode,
        "Extracting text"
    );

    let task =
        tokio::task::spawn_blocking(move || extract_text(engine.as_ref(), &data, &options));

    let result = tokio::time::timeout(Duration::from_secs(timeout_secs), task)
        .await
        .map_err(|_| DocumentError::Timeout(timeout_secs))?
        .map_err(|e| AppError::Internal(format!("Extraction task failed: {}", e)))??;

    tracing::info!(
        filename = %filename,
        total_pages = result.total_pages,
        extracted_pages = result.extracted_pages,
        "Extraction finished"
    );

    Ok(result)
}
