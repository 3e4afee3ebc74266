//! OCR Providers
//!
//! Defines the provider trait and implementations for different OCR backends.
//! Providers are synchronous: they are only ever called from the blocking
//! threads that run an extraction.

use std::io::Write;
use std::process::Command;

use super::types::{OcrError, OcrProviderKind, OcrResult};

/// OCR provider trait
pub trait OcrProvider: Send + Sync {
    /// Get the provider type
    fn kind(&self) -> OcrProviderKind;

    /// Check if the provider is available
    fn is_available(&self) -> bool;

    /// Perform OCR on a PNG image
    fn recognize(&self, image_png: &[u8], language: &str) -> Result<OcrResult, OcrError>;
}

/// Tesseract OCR provider (shells out to the `tesseract` binary)
pub struct TesseractProvider {
    /// Resolution the page images were rendered at
    dpi: u32,
}

impl TesseractProvider {
    pub fn new(dpi: u32) -> Self {
        Self { dpi }
    }
}

impl OcrProvider for TesseractProvider {
    fn kind(&self) -> OcrProviderKind {
        OcrProviderKind::Tesseract
    }

    fn is_available(&self) -> bool {
        Command::new("tesseract")
            .arg("--version")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    fn recognize(&self, image_png: &[u8], language: &str) -> Result<OcrResult, OcrError> {
        // Removed when `input` goes out of scope
        let mut input = tempfile::Builder::new()
            .prefix("ocr_input_")
            .suffix(".png")
            .tempfile()
            .map_err(|e| OcrError::Processing(format!("Failed to create temp file: {}", e)))?;

        input
            .write_all(image_png)
            .and_then(|_| input.flush())
            .map_err(|e| OcrError::Processing(format!("Failed to write temp file: {}", e)))?;

        let output = Command::new("tesseract")
            .arg(input.path())
            .arg("stdout")
            .arg("-l")
            .arg(language)
            .arg("--dpi")
            .arg(self.dpi.to_string())
            .arg("--psm")
            .arg("3")
            .output()
            .map_err(|e| OcrError::Processing(format!("Failed to run tesseract: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(OcrError::Processing(format!(
                "Tesseract failed: {}",
                stderr.trim()
            )));
        }

        Ok(OcrResult {
            text: String::from_utf8_lossy(&output.stdout).trim().to_string(),
            provider: OcrProviderKind::Tesseract,
        })
    }
}

/// Ollama vision model provider
pub struct OllamaProvider {
    /// Ollama API URL
    base_url: String,
    /// Model name (e.g., "llava", "bakllava")
    model: String,
}

impl OllamaProvider {
    pub fn new(base_url: &str, model: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        }
    }
}

impl OcrProvider for OllamaProvider {
    fn kind(&self) -> OcrProviderKind {
        OcrProviderKind::Ollama
    }

    fn is_available(&self) -> bool {
        let url = format!("{}/api/tags", self.base_url);
        match reqwest::blocking::Client::new().get(&url).send() {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }

    fn recognize(&self, image_png: &[u8], language: &str) -> Result<OcrResult, OcrError> {
        use base64::Engine;

        let url = format!("{}/api/generate", self.base_url);
        let image_base64 = base64::engine::general_purpose::STANDARD.encode(image_png);

        let prompt = format!(
            "Extract all text from this image exactly as written. The text is in {}. \
             Return only the extracted text, nothing else.",
            language
        );

        let request = serde_json::json!({
            "model": self.model,
            "prompt": prompt,
            "images": [image_base64],
            "stream": false
        });

        let response = reqwest::blocking::Client::new()
            .post(&url)
            .json(&request)
            .send()
            .map_err(|e| OcrError::Api(format!("Failed to call Ollama: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            return Err(OcrError::Api(format!("Ollama returned {}: {}", status, body)));
        }

        let result: serde_json::Value = response
            .json()
            .map_err(|e| OcrError::Api(format!("Failed to parse response: {}", e)))?;

        let text = result["response"].as_str().unwrap_or("").trim().to_string();

        Ok(OcrResult {
            text,
            provider: OcrProviderKind::Ollama,
        })
    }
}

/// Mock provider for testing
#[cfg(test)]
pub struct MockProvider {
    pub kind: OcrProviderKind,
    pub available: bool,
    pub response: Result<String, String>,
}

#[cfg(test)]
impl OcrProvider for MockProvider {
    fn kind(&self) -> OcrProviderKind {
        self.kind
    }

    fn is_available(&self) -> bool {
        self.available
    }

    fn recognize(&self, _image_png: &[u8], _language: &str) -> Result<OcrResult, OcrError> {
        match &self.response {
            Ok(text) => Ok(OcrResult {
                text: text.clone(),
                provider: self.kind,
            }),
            Err(msg) => Err(OcrError::Processing(msg.clone())),
        }
    }
}
