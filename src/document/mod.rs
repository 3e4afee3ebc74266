//! Document abstraction
//!
//! Types shared by the extraction routine, the PDF engine and the HTTP layer.
//!
//! ```text
//!   routes::extract ──► extraction::extract_text ──► PdfEngine::open
//!                                                        │
//!                                                        ▼
//!                                                  OpenDocument
//!                                         (page_count / page_text / page_ocr_text)
//! ```

mod error;
mod traits;
mod types;

pub use error::{DocumentError, DocumentResult, Result};
pub use traits::{OpenDocument, PdfEngine};
pub use types::{is_pdf_filename, ExtractionOptions, ExtractionResult, OcrMode, PageResult};
