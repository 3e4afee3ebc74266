//! OCR Module
//!
//! Recognizes text on rendered pages that carry no usable text layer.
//!
//! Supports multiple backends:
//! - Tesseract (local, requires the `tesseract` binary)
//! - Ollama vision models (local LLM)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pdf_extract_api::ocr::{OcrService, OcrServiceConfig};
//!
//! let service = OcrService::new(OcrServiceConfig::default());
//! let result = service.recognize(&page_png)?;
//! println!("{} via {:?}", result.text, result.provider);
//! ```

mod provider;
mod service;
mod types;

pub use provider::{OcrProvider, OllamaProvider, TesseractProvider};
pub use service::{OcrService, OcrServiceConfig};
pub use types::{OcrError, OcrProviderKind, OcrResult};

#[cfg(test)]
pub(crate) use provider::MockProvider;
