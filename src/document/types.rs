//! Extraction types
//!
//! Options going into an extraction and the structured result coming out.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// How OCR is used while extracting pages
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OcrMode {
    /// Text layer only
    #[default]
    Off,
    /// Text layer first, OCR when the page yields too little text
    Auto,
    /// OCR every page
    Force,
}

impl FromStr for OcrMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "off" | "none" | "" => Ok(Self::Off),
            "auto" => Ok(Self::Auto),
            "force" | "always" => Ok(Self::Force),
            other => Err(format!("unknown OCR mode '{}'", other)),
        }
    }
}

impl fmt::Display for OcrMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Off => "off",
            Self::Auto => "auto",
            Self::Force => "force",
        };
        f.write_str(name)
    }
}

/// Parameters for a single extraction
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionOptions {
    /// Maximum number of pages to process (`None` = all)
    pub max_pages: Option<usize>,
    /// Attach a notice when the cap cut the document short
    pub test_mode: bool,
    /// OCR behaviour
    pub ocr_mode: OcrMode,
}

impl ExtractionOptions {
    /// Full extraction, as served by the paid endpoint
    pub fn full(ocr_mode: OcrMode) -> Self {
        Self {
            max_pages: None,
            test_mode: false,
            ocr_mode,
        }
    }

    /// Capped extraction, as served by the free endpoint
    pub fn trial(max_pages: usize, ocr_mode: OcrMode) -> Self {
        Self {
            max_pages: Some(max_pages),
            test_mode: true,
            ocr_mode,
        }
    }
}

/// Text of one processed page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageResult {
    /// Page number (1-indexed)
    pub page: usize,
    /// Extracted text, possibly empty
    pub text: String,
    /// Whether OCR produced this text
    pub ocr: bool,
}

/// Outcome of an extraction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// Pages in the source document
    pub total_pages: usize,
    /// Pages actually processed
    pub extracted_pages: usize,
    /// Per-page results in document order
    pub pages: Vec<PageResult>,
    /// All page texts joined by a blank line
    pub full_text: String,
    /// Set when test mode stopped short of the full document
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

/// Check an upload filename for a `.pdf` extension (case-insensitive)
pub fn is_pdf_filename(filename: &str) -> bool {
    filename.to_lowercase().ends_with(".pdf")
}
