//! Page-by-page text extraction
//!
//! Opens a document through a [`PdfEngine`], walks its pages up to an optional
//! cap and collects the text of each one, falling back to OCR depending on
//! the configured [`OcrMode`].

use crate::document::{
    DocumentResult, ExtractionOptions, ExtractionResult, OcrMode, OpenDocument, PageResult,
    PdfEngine,
};

/// Stripped text shorter than this is treated as an unusable text layer in
/// [`OcrMode::Auto`]
pub const LOW_SIGNAL_THRESHOLD: usize = 20;

/// Page cap applied by the free endpoint
pub const FREE_TIER_PAGE_CAP: usize = 3;

/// Separator placed between page texts in `full_text`
const PAGE_SEPARATOR: &str = "\n\n";

/// Extract text from a PDF held in memory
///
/// The document handle is dropped before this returns, on success and on
/// every error path.
pub fn extract_text(
    engine: &dyn PdfEngine,
    data: &[u8],
    options: &ExtractionOptions,
) -> DocumentResult<ExtractionResult> {
    let document = engine.open(data)?;

    let total_pages = document.page_count()?;
    let pages_to_extract = options
        .max_pages
        .map_or(total_pages, |cap| cap.min(total_pages));

    let mut pages = Vec::with_capacity(pages_to_extract);
    for index in 0..pages_to_extract {
        let (text, ocr) = extract_page(document.as_ref(), index, options.ocr_mode)?;
        pages.push(PageResult {
            page: index + 1,
            text,
            ocr,
        });
    }

    drop(document);

    let full_text = pages
        .iter()
        .map(|p| p.text.as_str())
        .collect::<Vec<_>>()
        .join(PAGE_SEPARATOR);

    let notice = (options.test_mode && pages_to_extract < total_pages).then(|| {
        format!(
            "Test mode: Only first {} of {} pages extracted. Use paid endpoint for full extraction.",
            pages_to_extract, total_pages
        )
    });

    tracing::debug!(
        total_pages,
        extracted_pages = pages_to_extract,
        ocr_pages = pages.iter().filter(|p| p.ocr).count(),
        ocr_mode = %options.ocr_mode,
        "Extraction complete"
    );

    Ok(ExtractionResult {
        total_pages,
        extracted_pages: pages_to_extract,
        pages,
        full_text,
        notice,
    })
}

/// Extract one page, returning its text and whether OCR produced it
fn extract_page(
    document: &dyn OpenDocument,
    index: usize,
    mode: OcrMode,
) -> DocumentResult<(String, bool)> {
    match mode {
        OcrMode::Force => Ok((document.page_ocr_text(index)?, true)),
        OcrMode::Auto => {
            let text = document.page_text(index)?;
            if is_low_signal(&text) {
                tracing::debug!(page = index + 1, "Text layer too sparse, falling back to OCR");
                Ok((document.page_ocr_text(index)?, true))
            } else {
                Ok((text, false))
            }
        }
        OcrMode::Off => Ok((document.page_text(index)?, false)),
    }
}

fn is_low_signal(text: &str) -> bool {
    text.trim().chars().count() < LOW_SIGNAL_THRESHOLD
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;
    use crate::document::DocumentError;

    /// In-memory engine: each page has a text layer and an OCR result
    struct FakeEngine {
        pages: Vec<(String, String)>,
        fail_on_page: Option<usize>,
        closed: Arc<AtomicUsize>,
    }

    impl FakeEngine {
        fn new(pages: Vec<(&str, &str)>) -> Self {
            Self {
                pages: pages
                    .into_iter()
                    .map(|(t, o)| (t.to_string(), o.to_string()))
                    .collect(),
                fail_on_page: None,
                closed: Arc::new(AtomicUsize::new(0)),
            }
        }

        fn text_pages(count: usize) -> Self {
            let pages = (1..=count)
                .map(|n| {
                    (
                        format!("This is the text layer of page number {}.", n),
                        format!("ocr {}", n),
                    )
                })
                .collect();
            Self {
                pages,
                fail_on_page: None,
                closed: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    struct FakeDocument<'a> {
        engine: &'a FakeEngine,
    }

    impl Drop for FakeDocument<'_> {
        fn drop(&mut self) {
            self.engine.closed.fetch_add(1, Ordering::SeqCst);
        }
    }

    impl FakeDocument<'_> {
        fn check(&self, index: usize) -> DocumentResult<()> {
            if self.engine.fail_on_page == Some(index) {
                return Err(DocumentError::Render(format!("page {} is broken", index)));
            }
            if index >= self.engine.pages.len() {
                return Err(DocumentError::PageOutOfRange {
                    index,
                    count: self.engine.pages.len(),
                });
            }
            Ok(())
        }
    }

    impl OpenDocument for FakeDocument<'_> {
        fn page_count(&self) -> DocumentResult<usize> {
            Ok(self.engine.pages.len())
        }

        fn page_text(&self, index: usize) -> DocumentResult<String> {
            self.check(index)?;
            Ok(self.engine.pages[index].0.clone())
        }

        fn page_ocr_text(&self, index: usize) -> DocumentResult<String> {
            self.check(index)?;
            Ok(self.engine.pages[index].1.clone())
        }
    }

    impl PdfEngine for FakeEngine {
        fn open<'a>(&'a self, data: &'a [u8]) -> DocumentResult<Box<dyn OpenDocument + 'a>> {
            if !data.starts_with(b"%PDF") {
                return Err(DocumentError::InvalidDocument("not a PDF".to_string()));
            }
            Ok(Box::new(FakeDocument { engine: self }))
        }
    }

    const PDF: &[u8] = b"%PDF-1.7 fake";

    #[test]
    fn test_five_pages_no_cap() {
        let engine = FakeEngine::text_pages(5);
        let result = extract_text(&engine, PDF, &ExtractionOptions::full(OcrMode::Off)).unwrap();

        assert_eq!(result.total_pages, 5);
        assert_eq!(result.extracted_pages, 5);
        assert_eq!(result.pages.len(), 5);
        assert!(result.notice.is_none());
        assert!(result.pages.iter().all(|p| !p.ocr));
    }

    #[test]
    fn test_trial_cap_adds_notice() {
        let engine = FakeEngine::text_pages(5);
        let options = ExtractionOptions::trial(FREE_TIER_PAGE_CAP, OcrMode::Off);
        let result = extract_text(&engine, PDF, &options).unwrap();

        assert_eq!(result.total_pages, 5);
        assert_eq!(result.extracted_pages, 3);
        let notice = result.notice.expect("notice should be set");
        assert!(notice.contains("3 of 5"));
        assert!(notice.contains("paid endpoint"));
    }

    #[test]
    fn test_cap_larger_than_document_is_clamped() {
        let engine = FakeEngine::text_pages(2);
        let options = ExtractionOptions::trial(10, OcrMode::Off);
        let result = extract_text(&engine, PDF, &options).unwrap();

        assert_eq!(result.total_pages, 2);
        assert_eq!(result.extracted_pages, 2);
        assert!(result.notice.is_none());
    }

    #[test]
    fn test_zero_cap_yields_empty_result() {
        let engine = FakeEngine::text_pages(4);
        let options = ExtractionOptions {
            max_pages: Some(0),
            test_mode: false,
            ocr_mode: OcrMode::Off,
        };
        let result = extract_text(&engine, PDF, &options).unwrap();

        assert_eq!(result.total_pages, 4);
        assert_eq!(result.extracted_pages, 0);
        assert!(result.pages.is_empty());
        assert_eq!(result.full_text, "");
        assert!(result.notice.is_none());
    }

    #[test]
    fn test_notice_only_in_test_mode() {
        let engine = FakeEngine::text_pages(5);
        let options = ExtractionOptions {
            max_pages: Some(2),
            test_mode: false,
            ocr_mode: OcrMode::Off,
        };
        let result = extract_text(&engine, PDF, &options).unwrap();

        assert_eq!(result.extracted_pages, 2);
        assert!(result.notice.is_none());
    }

    #[test]
    fn test_page_numbers_and_full_text() {
        let engine = FakeEngine::new(vec![("alpha", ""), ("", ""), ("gamma\n", "")]);
        let result = extract_text(&engine, PDF, &ExtractionOptions::default()).unwrap();

        let numbers: Vec<usize> = result.pages.iter().map(|p| p.page).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert_eq!(result.full_text, "alpha\n\n\n\ngamma\n");
    }

    #[test]
    fn test_force_mode_uses_ocr_everywhere() {
        let engine = FakeEngine::text_pages(3);
        let result = extract_text(&engine, PDF, &ExtractionOptions::full(OcrMode::Force)).unwrap();

        assert!(result.pages.iter().all(|p| p.ocr));
        assert_eq!(result.pages[1].text, "ocr 2");
    }

    #[test]
    fn test_auto_mode_falls_back_on_sparse_pages() {
        let long = "A page with plenty of embedded text in it.";
        let engine = FakeEngine::new(vec![
            (long, "unused"),
            ("   short   \n", "recognized scan"),
            ("", "blank page scan"),
            // exactly at the threshold is kept
            ("12345678901234567890", "unused"),
            // 19 characters after stripping falls back
            ("  1234567890123456789  ", "ocr text"),
        ]);
        let result = extract_text(&engine, PDF, &ExtractionOptions::full(OcrMode::Auto)).unwrap();

        let flags: Vec<bool> = result.pages.iter().map(|p| p.ocr).collect();
        assert_eq!(flags, vec![false, true, true, false, true]);
        assert_eq!(result.pages[0].text, long);
        assert_eq!(result.pages[1].text, "recognized scan");
        assert_eq!(result.pages[2].text, "blank page scan");
    }

    #[test]
    fn test_auto_threshold_counts_characters_not_bytes() {
        // 10 characters, 20+ bytes in UTF-8
        let engine = FakeEngine::new(vec![("éééééééééé", "fallback")]);
        let result = extract_text(&engine, PDF, &ExtractionOptions::full(OcrMode::Auto)).unwrap();
        assert!(result.pages[0].ocr);
    }

    #[test]
    fn test_invalid_document_is_an_error() {
        let engine = FakeEngine::text_pages(2);
        let err = extract_text(&engine, b"garbage", &ExtractionOptions::default()).unwrap_err();
        assert!(matches!(err, DocumentError::InvalidDocument(_)));
    }

    #[test]
    fn test_document_released_on_success_and_failure() {
        let engine = FakeEngine::text_pages(3);
        extract_text(&engine, PDF, &ExtractionOptions::default()).unwrap();
        assert_eq!(engine.closed.load(Ordering::SeqCst), 1);

        let mut failing = FakeEngine::text_pages(3);
        failing.fail_on_page = Some(1);
        let err = extract_text(&failing, PDF, &ExtractionOptions::default()).unwrap_err();
        assert!(matches!(err, DocumentError::Render(_)));
        assert_eq!(failing.closed.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_extraction_is_idempotent() {
        let engine = FakeEngine::text_pages(4);
        let options = ExtractionOptions::trial(3, OcrMode::Auto);
        let first = extract_text(&engine, PDF, &options).unwrap();
        let second = extract_text(&engine, PDF, &options).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_extracted_pages_matches_min_of_cap_and_total() {
        for total in 0..6 {
            let engine = FakeEngine::text_pages(total);
            for cap in 0..8 {
                let options = ExtractionOptions::trial(cap, OcrMode::Off);
                let result = extract_text(&engine, PDF, &options).unwrap();
                assert_eq!(result.extracted_pages, cap.min(total));
                assert_eq!(result.pages.len(), result.extracted_pages);
                assert_eq!(result.notice.is_some(), result.extracted_pages < total);
                let joined = result
                    .pages
                    .iter()
                    .map(|p| p.text.clone())
                    .collect::<Vec<_>>()
                    .join("\n\n");
                assert_eq!(result.full_text, joined);
            }
        }
    }
}
