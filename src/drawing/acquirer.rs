//! Token acquisition
//!
//! Rasterizes the page (falling back to a blank placeholder) and runs OCR on
//! the result. Both collaborator calls are bounded by timeouts.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;

use super::error::AcquisitionError;
use super::pipeline::PipelineConfig;
use super::types::TextToken;
use crate::ocr::{OcrProviderTrait, OcrResult, OcrWord};
use crate::raster::{placeholder_png, Rasterizer, PLACEHOLDER_SIZE};

pub struct TokenAcquirer {
    rasterizer: Arc<dyn Rasterizer>,
    ocr: Arc<dyn OcrProviderTrait>,
    dpi: u32,
    raster_timeout: Duration,
    ocr_timeout: Duration,
    ocr_attempts: u32,
    language: Option<String>,
    min_word_confidence: f64,
}

impl TokenAcquirer {
    pub fn new(
        config: &PipelineConfig,
        rasterizer: Arc<dyn Rasterizer>,
        ocr: Arc<dyn OcrProviderTrait>,
    ) -> Self {
        Self {
            rasterizer,
            ocr,
            dpi: config.ocr_dpi,
            raster_timeout: config.raster_timeout,
            ocr_timeout: config.ocr_timeout,
            ocr_attempts: config.ocr_attempts.max(1),
            language: config.ocr_language.clone(),
            min_word_confidence: config.min_word_confidence,
        }
    }

    /// Acquire the page's tokens. Recovered failures are appended to `errors`.
    pub async fn acquire(
        &self,
        page_bytes: &[u8],
        errors: &mut Vec<String>,
    ) -> Result<Vec<TextToken>, AcquisitionError> {
        let (image, used_placeholder) = match self.rasterize(page_bytes).await {
            Ok(image) => (image, false),
            Err(e) => {
                tracing::warn!("{}; continuing with a blank placeholder page", e);
                errors.push(e.to_string());
                (placeholder_png(PLACEHOLDER_SIZE, PLACEHOLDER_SIZE)?, true)
            }
        };

        let result = self.recognize(&image).await?;
        tracing::debug!(
            "OCR ({}) recognized {} words, mean confidence {:.1} (placeholder: {})",
            result.provider,
            result.words.len(),
            result.confidence,
            used_placeholder
        );
        tracing::trace!("OCR text: {}", result.text);

        let tokens = self.to_tokens(result.words);
        tracing::debug!("{} tokens kept after confidence filter", tokens.len());

        if tokens.is_empty() && used_placeholder {
            return Err(AcquisitionError::EmptyRecognitionResult);
        }
        Ok(tokens)
    }

    async fn rasterize(&self, page_bytes: &[u8]) -> Result<Vec<u8>, AcquisitionError> {
        match timeout(self.raster_timeout, self.rasterizer.rasterize(page_bytes, self.dpi)).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(AcquisitionError::Timeout {
                stage: "Rasterization",
                secs: self.raster_timeout.as_secs(),
            }),
        }
    }

    async fn recognize(&self, image: &[u8]) -> Result<OcrResult, AcquisitionError> {
        let mut last_error = String::new();

        for attempt in 1..=self.ocr_attempts {
            match timeout(self.ocr_timeout, self.ocr.recognize(image, self.language.as_deref())).await {
                Ok(Ok(result)) => return Ok(result),
                Ok(Err(e)) => last_error = e.to_string(),
                Err(_) => {
                    last_error = AcquisitionError::Timeout {
                        stage: "Text recognition",
                        secs: self.ocr_timeout.as_secs(),
                    }
                    .to_string()
                }
            }
            tracing::warn!(
                "OCR attempt {}/{} with {} failed: {}",
                attempt,
                self.ocr_attempts,
                self.ocr.provider_name(),
                last_error
            );
        }

        tracing::error!("OCR gave up after {} attempt(s)", self.ocr_attempts);
        Err(AcquisitionError::Recognition {
            attempts: self.ocr_attempts,
            reason: last_error,
        })
    }

    fn to_tokens(&self, words: Vec<OcrWord>) -> Vec<TextToken> {
        words
            .into_iter()
            .filter(|w| w.confidence >= self.min_word_confidence)
            .filter_map(|w| {
                TextToken::new(&w.text, w.bounds.x, w.bounds.y, w.bounds.width, w.bounds.height)
            })
            .collect()
    }
}
