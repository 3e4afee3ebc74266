//! Configuration management for the PDF Extraction API

use std::env;
use std::path::PathBuf;

use thiserror::Error;

use crate::document::OcrMode;
use crate::ocr::{OcrProviderKind, OcrServiceConfig};
use crate::payment::{parse_usd_price, Network, PaymentConfig};

/// Configuration errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: &'static str, message: String },
}

impl ConfigError {
    fn invalid(key: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            key,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub payment: PaymentConfig,
    pub extraction: ExtractionConfig,
    pub ocr: OcrServiceConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Directory holding the landing page
    pub static_dir: PathBuf,
}

#[derive(Debug, Clone)]
pub struct ExtractionConfig {
    /// OCR behaviour for both extraction endpoints
    pub ocr_mode: OcrMode,
    /// Upper bound on a single extraction, OCR included
    pub timeout_secs: u64,
    /// Largest accepted multipart body
    pub max_upload_bytes: usize,
}

pub const DEFAULT_PAY_TO: &str = "0x6b21227Ca9Bb3590BB62ff60BA0EFbBf9Ba22ACC";
pub const DEFAULT_PRICE: &str = "$0.01";
pub const DEFAULT_FACILITATOR_URL: &str = "https://x402.org/facilitator";

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8000,
                static_dir: PathBuf::from("static"),
            },
            payment: PaymentConfig {
                pay_to: DEFAULT_PAY_TO.to_string(),
                network: Network::Base,
                price_atomic: 10_000,
                facilitator_url: DEFAULT_FACILITATOR_URL.to_string(),
                max_timeout_seconds: 60,
            },
            extraction: ExtractionConfig {
                ocr_mode: OcrMode::Off,
                timeout_secs: 120,
                max_upload_bytes: 50 * 1024 * 1024,
            },
            ocr: OcrServiceConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let pay_to = get("PAY_TO_ADDRESS").unwrap_or(defaults.payment.pay_to);
        if !is_evm_address(&pay_to) {
            return Err(ConfigError::invalid(
                "PAY_TO_ADDRESS",
                format!("'{}' is not a 0x-prefixed 20-byte hex address", pay_to),
            ));
        }

        let network = match get("X402_NETWORK") {
            Some(v) => v
                .parse::<Network>()
                .map_err(|e| ConfigError::invalid("X402_NETWORK", e))?,
            None => defaults.payment.network,
        };

        let price_atomic = match get("X402_PRICE") {
            Some(v) => parse_usd_price(&v).map_err(|e| ConfigError::invalid("X402_PRICE", e))?,
            None => defaults.payment.price_atomic,
        };

        let ocr_mode = match get("OCR_MODE") {
            Some(v) => v
                .parse::<OcrMode>()
                .map_err(|e| ConfigError::invalid("OCR_MODE", e))?,
            None => defaults.extraction.ocr_mode,
        };

        let providers = match get("OCR_PROVIDERS") {
            Some(v) => v
                .split(',')
                .filter(|s| !s.trim().is_empty())
                .map(|s| s.parse::<OcrProviderKind>())
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| ConfigError::invalid("OCR_PROVIDERS", e))?,
            None => defaults.ocr.providers,
        };

        Ok(Config {
            server: ServerConfig {
                host: get("SERVER_HOST").unwrap_or(defaults.server.host),
                port: parse_or(get("SERVER_PORT"), "SERVER_PORT", defaults.server.port)?,
                static_dir: get("STATIC_DIR")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.server.static_dir),
            },
            payment: PaymentConfig {
                pay_to,
                network,
                price_atomic,
                facilitator_url: get("X402_FACILITATOR_URL")
                    .map(|u| u.trim_end_matches('/').to_string())
                    .unwrap_or(defaults.payment.facilitator_url),
                max_timeout_seconds: parse_or(
                    get("X402_MAX_TIMEOUT_SECONDS"),
                    "X402_MAX_TIMEOUT_SECONDS",
                    defaults.payment.max_timeout_seconds,
                )?,
            },
            extraction: ExtractionConfig {
                ocr_mode,
                timeout_secs: parse_or(
                    get("EXTRACT_TIMEOUT_SECS"),
                    "EXTRACT_TIMEOUT_SECS",
                    defaults.extraction.timeout_secs,
                )?,
                max_upload_bytes: parse_or(
                    get("MAX_UPLOAD_BYTES"),
                    "MAX_UPLOAD_BYTES",
                    defaults.extraction.max_upload_bytes,
                )?,
            },
            ocr: OcrServiceConfig {
                providers,
                ollama_url: get("OLLAMA_URL").unwrap_or(defaults.ocr.ollama_url),
                ollama_model: get("OLLAMA_MODEL").unwrap_or(defaults.ocr.ollama_model),
                language: get("OCR_LANGUAGE").unwrap_or(defaults.ocr.language),
                dpi: parse_or(get("OCR_DPI"), "OCR_DPI", defaults.ocr.dpi)?,
            },
        })
    }
}

fn parse_or<T>(value: Option<String>, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match value {
        Some(v) => v
            .trim()
            .parse()
            .map_err(|e: T::Err| ConfigError::invalid(key, format!("'{}': {}", v, e))),
        None => Ok(default),
    }
}

fn is_evm_address(s: &str) -> bool {
    s.strip_prefix("0x")
        .map(|hex| hex.len() == 40 && hex.chars().all(|c| c.is_ascii_hexdigit()))
        .unwrap_or(false)
}
