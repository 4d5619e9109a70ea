//! OCR Types
//!
//! Word-level recognition output in page-pixel coordinates.

use serde::Serialize;

/// Pixel-based rectangle (origin top-left)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PixelRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// OCR result
#[derive(Debug, Clone, Serialize)]
pub struct OcrResult {
    /// Recognized text, words joined by spaces
    pub text: String,
    /// Mean word confidence (0-100)
    pub confidence: f64,
    /// Provider used
    pub provider: String,
    /// Individual word results
    pub words: Vec<OcrWord>,
}

impl OcrResult {
    /// Assemble a result from recognized words
    pub fn from_words(provider: &str, words: Vec<OcrWord>) -> Self {
        let text = words
            .iter()
            .map(|w| w.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        let confidence = if words.is_empty() {
            0.0
        } else {
            words.iter().map(|w| w.confidence).sum::<f64>() / words.len() as f64
        };

        Self {
            text,
            confidence,
            provider: provider.to_string(),
            words,
        }
    }
}

/// Single word OCR result
#[derive(Debug, Clone, Serialize)]
pub struct OcrWord {
    /// Word text
    pub text: String,
    /// Confidence for this word (0-100)
    pub confidence: f64,
    /// Bounding box in pixels
    pub bounds: PixelRect,
}

/// OCR error types
#[derive(Debug, thiserror::Error)]
pub enum OcrError {
    #[error("OCR provider not available: {0}")]
    ProviderNotAvailable(String),

    #[error("OCR processing failed: {0}")]
    ProcessingError(String),

    #[error("Failed to parse OCR output: {0}")]
    OutputParseError(String),
}
