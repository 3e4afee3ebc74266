//! OCR Service
//!
//! Orchestrates OCR providers in a configured order.

use std::sync::{Arc, OnceLock};

use super::{
    provider::{OcrProvider, OllamaProvider, TesseractProvider},
    types::{OcrError, OcrProviderKind, OcrResult},
};

/// OCR service configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OcrServiceConfig {
    /// Preferred provider order
    pub providers: Vec<OcrProviderKind>,
    /// Ollama base URL
    pub ollama_url: String,
    /// Ollama model name
    pub ollama_model: String,
    /// OCR language
    pub language: String,
    /// Resolution pages are rendered at before recognition
    pub dpi: u32,
}

impl Default for OcrServiceConfig {
    fn default() -> Self {
        Self {
            providers: vec![OcrProviderKind::Tesseract, OcrProviderKind::Ollama],
            ollama_url: "http://localhost:11434".to_string(),
            ollama_model: "llava".to_string(),
            language: "eng".to_string(),
            dpi: 300,
        }
    }
}

/// OCR service used by the PDF engine for scanned pages
pub struct OcrService {
    config: OcrServiceConfig,
    providers: Vec<Arc<dyn OcrProvider>>,
    /// Availability of each provider, probed on first use
    availability: OnceLock<Vec<bool>>,
}

impl OcrService {
    /// Create a new OCR service
    pub fn new(config: OcrServiceConfig) -> Self {
        let providers = config
            .providers
            .iter()
            .map(|kind| -> Arc<dyn OcrProvider> {
                match kind {
                    OcrProviderKind::Tesseract => Arc::new(TesseractProvider::new(config.dpi)),
                    OcrProviderKind::Ollama => Arc::new(OllamaProvider::new(
                        &config.ollama_url,
                        &config.ollama_model,
                    )),
                }
            })
            .collect();

        Self::with_providers(config, providers)
    }

    /// Create a service from explicit providers
    pub fn with_providers(config: OcrServiceConfig, providers: Vec<Arc<dyn OcrProvider>>) -> Self {
        Self {
            config,
            providers,
            availability: OnceLock::new(),
        }
    }

    /// Resolution pages should be rendered at
    pub fn dpi(&self) -> u32 {
        self.config.dpi
    }

    /// Get available providers
    ///
    /// The first call probes every provider; later calls reuse the result.
    pub fn available_providers(&self) -> Vec<OcrProviderKind> {
        self.providers
            .iter()
            .zip(self.availability())
            .filter(|(_, available)| **available)
            .map(|(p, _)| p.kind())
            .collect()
    }

    fn availability(&self) -> &[bool] {
        self.availability
            .get_or_init(|| self.providers.iter().map(|p| p.is_available()).collect())
    }

    /// Recognize text in a PNG image
    ///
    /// Providers are tried in order; the first available one that succeeds wins.
    /// When every available provider fails, the last failure is returned.
    pub fn recognize(&self, image_png: &[u8]) -> Result<OcrResult, OcrError> {
        let language = self.config.language.as_str();
        let mut last_error = None;

        for (provider, available) in self.providers.iter().zip(self.availability()) {
            if !available {
                tracing::debug!("OCR provider {:?} unavailable, skipping", provider.kind());
                continue;
            }

            match provider.recognize(image_png, language) {
                Ok(result) => return Ok(result),
                Err(e) => {
                    tracing::warn!(
                        "OCR provider {:?} failed: {}, trying next",
                        provider.kind(),
                        e
                    );
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            OcrError::ProviderNotAvailable("No OCR providers available".to_string())
        }))
    }
}
