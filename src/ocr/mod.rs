//! OCR Module
//!
//! Word-level text recognition for rasterized drawing pages.
//!
//! Backends implement [`OcrProviderTrait`]; the bundled one drives the
//! `tesseract` CLI and reads its TSV output.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use balloon_extract::ocr::{OcrProviderTrait, TesseractConfig, TesseractProvider};
//!
//! let provider = TesseractProvider::new(TesseractConfig::default());
//! if provider.is_available().await {
//!     let result = provider.recognize(&png_bytes, Some("eng")).await?;
//!     for word in result.words {
//!         println!("{} @ {:?}", word.text, word.bounds);
//!     }
//! }
//! ```

mod provider;
mod types;

pub use provider::{parse_tsv, OcrProviderTrait, TesseractConfig, TesseractProvider};
pub use types::{OcrError, OcrResult, OcrWord, PixelRect};
