//! Application state management

use std::sync::Arc;

use crate::config::Config;
use crate::document::PdfEngine;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: Config,
    engine: Arc<dyn PdfEngine>,
}

impl AppState {
    /// Create a new application state
    pub fn new(config: Config, engine: Arc<dyn PdfEngine>) -> Self {
        Self {
            inner: Arc::new(AppStateInner { config, engine }),
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Get the PDF engine
    pub fn engine(&self) -> Arc<dyn PdfEngine> {
        Arc::clone(&self.inner.engine)
    }
}
