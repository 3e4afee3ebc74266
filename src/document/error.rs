//! Document error types
//!
//! Failures raised while opening a document or pulling text out of its pages.

use thiserror::Error;

use crate::ocr::OcrError;

/// Document-level error type
#[derive(Debug, Error)]
pub enum DocumentError {
    /// Bytes are not something the engine can open as a PDF
    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    /// Error raised by the PDF engine itself
    #[error("PDF engine error: {0}")]
    Engine(String),

    /// Requested page does not exist
    #[error("Page {index} out of range (document has {count} pages)")]
    PageOutOfRange { index: usize, count: usize },

    /// Failed to rasterize a page
    #[error("Render error: {0}")]
    Render(String),

    /// OCR on a rendered page failed
    #[error("OCR error: {0}")]
    Ocr(#[from] OcrError),

    /// Extraction did not finish in time
    #[error("Extraction timed out after {0} seconds")]
    Timeout(u64),
}

/// Result type alias for document operations
pub type Result<T> = std::result::Result<T, DocumentError>;

/// Alias for Result
pub type DocumentResult<T> = Result<T>;

impl From<mupdf::Error> for DocumentError {
    fn from(err: mupdf::Error) -> Self {
        DocumentError::Engine(err.to_string())
    }
}
