//! MuPDF-backed [`PdfEngine`]
//!
//! Each call to [`PdfEngine::open`] parses a fresh `mupdf::Document` from the
//! uploaded bytes. MuPDF documents are not thread-safe, so the handle never
//! leaves the blocking thread that opened it and is dropped when the
//! extraction finishes.

use std::sync::Arc;

use mupdf::{Document, Page};

use crate::document::{DocumentError, OpenDocument, PdfEngine, Result};
use crate::ocr::OcrService;

use super::render::render_page_png;
use super::stext::extract_plain_text;

const PDF_MIME: &str = "application/pdf";

/// How far into the stream the `%PDF` marker may appear
const HEADER_SEARCH_WINDOW: usize = 1024;

/// PDF engine backed by MuPDF, with OCR through an [`OcrService`]
pub struct MupdfEngine {
    ocr: Arc<OcrService>,
}

impl MupdfEngine {
    pub fn new(ocr: Arc<OcrService>) -> Self {
        Self { ocr }
    }
}

impl PdfEngine for MupdfEngine {
    fn open<'a>(&'a self, data: &'a [u8]) -> Result<Box<dyn OpenDocument + 'a>> {
        if !has_pdf_header(data) {
            return Err(DocumentError::InvalidDocument(
                "missing %PDF header".to_string(),
            ));
        }

        let doc = Document::from_bytes(data, PDF_MIME)
            .map_err(|e| DocumentError::InvalidDocument(e.to_string()))?;
        let page_count = doc.page_count()?.max(0) as usize;

        Ok(Box::new(MupdfDocument {
            doc,
            page_count,
            ocr: &self.ocr,
        }))
    }
}

/// An opened MuPDF document
struct MupdfDocument<'a> {
    doc: Document,
    page_count: usize,
    ocr: &'a OcrService,
}

impl MupdfDocument<'_> {
    fn load_page(&self, index: usize) -> Result<Page> {
        if index >= self.page_count {
            return Err(DocumentError::PageOutOfRange {
                index,
                count: self.page_count,
            });
        }
        Ok(self.doc.load_page(index as i32)?)
    }
}

impl OpenDocument for MupdfDocument<'_> {
    fn page_count(&self) -> Result<usize> {
        Ok(self.page_count)
    }

    fn page_text(&self, index: usize) -> Result<String> {
        let page = self.load_page(index)?;
        extract_plain_text(&page)
    }

    fn page_ocr_text(&self, index: usize) -> Result<String> {
        let page = self.load_page(index)?;
        let png = render_page_png(&page, self.ocr.dpi())?;
        let result = self.ocr.recognize(&png)?;

        tracing::debug!(
            page = index + 1,
            provider = ?result.provider,
            chars = result.text.len(),
            "OCR page complete"
        );

        Ok(result.text)
    }
}

fn has_pdf_header(data: &[u8]) -> bool {
    let window = &data[..data.len().min(HEADER_SEARCH_WINDOW)];
    window.windows(4).any(|w| w == b"%PDF")
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::document::{ExtractionOptions, OcrMode};
    use crate::extraction::extract_text;
    use crate::ocr::{MockProvider, OcrProvider, OcrProviderKind, OcrServiceConfig};

    /// Build a minimal PDF with one line of Helvetica text per page
    pub(crate) fn build_pdf(pages: &[&str]) -> Vec<u8> {
        let mut objects: Vec<String> = Vec::new();

        let kids = (0..pages.len())
            .map(|i| format!("{} 0 R", 4 + 2 * i))
            .collect::<Vec<_>>()
            .join(" ");

        objects.push("<< /Type /Catalog /Pages 2 0 R >>".to_string());
        objects.push(format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids,
            pages.len()
        ));
        objects.push("<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_string());

        for (i, text) in pages.iter().enumerate() {
            objects.push(format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
                 /Resources << /Font << /F1 3 0 R >> >> /Contents {} 0 R >>",
                5 + 2 * i
            ));
            let stream = format!("BT /F1 12 Tf 72 720 Td ({}) Tj ET", text);
            objects.push(format!(
                "<< /Length {} >>\nstream\n{}\nendstream",
                stream.len(),
                stream
            ));
        }

        let mut out = b"%PDF-1.4\n".to_vec();
        let mut offsets = Vec::with_capacity(objects.len());
        for (i, body) in objects.iter().enumerate() {
            offsets.push(out.len());
            out.extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", i + 1, body).as_bytes());
        }

        let xref_offset = out.len();
        out.extend_from_slice(format!("xref\n0 {}\n", objects.len() + 1).as_bytes());
        out.extend_from_slice(b"0000000000 65535 f \n");
        for offset in offsets {
            out.extend_from_slice(format!("{:010} 00000 n \n", offset).as_bytes());
        }
        out.extend_from_slice(
            format!(
                "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
                objects.len() + 1,
                xref_offset
            )
            .as_bytes(),
        );

        out
    }

    fn engine_with_mock_ocr(text: &str) -> MupdfEngine {
        let provider: Arc<dyn OcrProvider> = Arc::new(MockProvider {
            kind: OcrProviderKind::Tesseract,
            available: true,
            response: Ok(text.to_string()),
        });
        let config = OcrServiceConfig {
            dpi: 72,
            ..Default::default()
        };
        MupdfEngine::new(Arc::new(OcrService::with_providers(config, vec![provider])))
    }

    #[test]
    fn test_header_detection() {
        assert!(has_pdf_header(b"%PDF-1.7\n..."));
        assert!(has_pdf_header(b"\xef\xbb\xbf%PDF-1.4"));
        assert!(!has_pdf_header(b"PK\x03\x04 not a pdf"));
        assert!(!has_pdf_header(b""));
    }

    #[test]
    fn test_open_counts_pages() {
        let engine = engine_with_mock_ocr("unused");
        let data = build_pdf(&["First page", "Second page", "Third page"]);

        let doc = engine.open(&data).unwrap();
        assert_eq!(doc.page_count().unwrap(), 3);
    }

    #[test]
    fn test_page_text_reads_text_layer() {
        let engine = engine_with_mock_ocr("unused");
        let data = build_pdf(&["Hello from page one", "Hello from page two"]);

        let doc = engine.open(&data).unwrap();
        assert!(doc.page_text(0).unwrap().contains("Hello from page one"));
        assert!(doc.page_text(1).unwrap().contains("Hello from page two"));
    }

    #[test]
    fn test_page_out_of_range() {
        let engine = engine_with_mock_ocr("unused");
        let data = build_pdf(&["Only page"]);

        let doc = engine.open(&data).unwrap();
        assert!(matches!(
            doc.page_text(1),
            Err(DocumentError::PageOutOfRange { index: 1, count: 1 })
        ));
    }

    #[test]
    fn test_garbage_bytes_rejected() {
        let engine = engine_with_mock_ocr("unused");
        let result = engine.open(b"this is definitely not a pdf document");
        assert!(matches!(result, Err(DocumentError::InvalidDocument(_))));
    }

    #[test]
    fn test_page_ocr_text_renders_and_recognizes() {
        let engine = engine_with_mock_ocr("recognized words");
        let data = build_pdf(&["Scanned page"]);

        let doc = engine.open(&data).unwrap();
        assert_eq!(doc.page_ocr_text(0).unwrap(), "recognized words");
    }

    #[test]
    fn test_extract_five_page_document() {
        let engine = engine_with_mock_ocr("unused");
        let data = build_pdf(&[
            "Page one of the sample document",
            "Page two of the sample document",
            "Page three of the sample document",
            "Page four of the sample document",
            "Page five of the sample document",
        ]);

        let full = extract_text(&engine, &data, &ExtractionOptions::full(OcrMode::Off)).unwrap();
        assert_eq!(full.total_pages, 5);
        assert_eq!(full.extracted_pages, 5);
        assert!(full.notice.is_none());
        assert!(full.full_text.contains("Page five of the sample document"));

        let trial = extract_text(&engine, &data, &ExtractionOptions::trial(3, OcrMode::Off)).unwrap();
        assert_eq!(trial.extracted_pages, 3);
        assert!(trial.notice.unwrap().contains("3 of 5"));
        assert!(!trial.full_text.contains("Page four"));
    }

    #[test]
    fn test_auto_mode_on_real_pages() {
        let engine = engine_with_mock_ocr("from ocr");
        let data = build_pdf(&["This page has a perfectly good text layer", "tiny"]);

        let result = extract_text(&engine, &data, &ExtractionOptions::full(OcrMode::Auto)).unwrap();
        assert!(!result.pages[0].ocr);
        assert!(result.pages[1].ocr);
        assert_eq!(result.pages[1].text, "from ocr");
    }
}
