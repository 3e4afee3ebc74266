//! Document traits
//!
//! The seam between the extraction routine and whatever library actually
//! understands PDF files.

use super::error::Result;

/// A library able to open PDF documents from bytes
///
/// Implementations are called from blocking worker threads.
pub trait PdfEngine: Send + Sync {
    /// Open a document held in memory
    ///
    /// The returned handle owns every engine resource tied to the document;
    /// dropping it releases them.
    fn open<'a>(&'a self, data: &'a [u8]) -> Result<Box<dyn OpenDocument + 'a>>;
}

/// An opened document
pub trait OpenDocument {
    /// Number of pages in the document
    fn page_count(&self) -> Result<usize>;

    /// Text from the page's embedded text layer (0-indexed)
    fn page_text(&self, index: usize) -> Result<String>;

    /// Text recognized from a rendered image of the page (0-indexed)
    fn page_ocr_text(&self, index: usize) -> Result<String>;
}
