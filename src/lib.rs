//! PDF Extraction API
//!
//! HTTP service that extracts plain text from uploaded PDF documents. The
//! full extraction endpoint is paid per call with x402 micropayments; a free
//! endpoint extracts the first few pages for evaluation.
//!
//! # Modules
//!
//! - `extraction`: Page-by-page text extraction with OCR fallback
//! - `document`: Engine-agnostic document traits and result types
//! - `mupdf`: MuPDF-backed engine (text layer, page rendering)
//! - `ocr`: OCR providers (Tesseract CLI, Ollama vision model)
//! - `payment`: x402 payment gate and facilitator client
//! - `routes`: HTTP handlers

pub mod config;
pub mod document;
pub mod error;
pub mod extraction;
pub mod mupdf;
pub mod ocr;
pub mod payment;
pub mod routes;
pub mod state;
