//! Low-level MuPDF Wrapper
//!
//! Implements the [`PdfEngine`](crate::document::PdfEngine) seam on top of the
//! MuPDF library: opening documents from bytes, reading the text layer and
//! rasterizing pages for OCR.
//!
//! # Thread Safety
//!
//! MuPDF's `fz_context` is **NOT thread-safe**. Documents are opened fresh for
//! every extraction on a tokio blocking thread and never shared.
//!
//! # Usage
//!
//! ```rust,ignore
//! use pdf_extract_api::mupdf::MupdfEngine;
//!
//! let engine = MupdfEngine::new(ocr_service);
//! let doc = engine.open(&pdf_bytes)?;
//! let text = doc.page_text(0)?;
//! ```

mod engine;
mod render;
mod stext;

pub use engine::MupdfEngine;

#[cfg(test)]
pub(crate) use engine::tests::build_pdf;
