//! Page processing pipeline
//!
//! Runs classify -> acquire tokens -> detect balloons -> correlate for one
//! page and always produces a [`ProcessingResult`]. Token acquisition is the
//! only stage that can fail a run; every later stage is a total function.
//!
//! ```text
//! Start → Classified → TokensAcquired → BalloonsDetected → Correlated → Done
//!                           ↓
//!                         Failed
//! ```

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::acquirer::TokenAcquirer;
use super::balloon::BalloonDetector;
use super::classifier::PageClassifier;
use super::correlate::Correlator;
use super::types::{ProcessingResult, TokenSource};
use crate::ocr::OcrProviderTrait;
use crate::raster::Rasterizer;

pub const DEFAULT_ISOLATION_PX: f64 = 30.0;
pub const DEFAULT_CORRELATION_RADIUS_PX: f64 = 200.0;
pub const DEFAULT_OCR_CONFIDENCE_DERATE: f64 = 0.8;
pub const DEFAULT_VECTOR_STD_DEV_THRESHOLD: f64 = 50.0;
pub const DEFAULT_CLASSIFY_DPI: u32 = 72;
pub const DEFAULT_OCR_DPI: u32 = 300;
pub const DEFAULT_RASTER_TIMEOUT_SECS: u64 = 20;
pub const DEFAULT_OCR_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_OCR_ATTEMPTS: u32 = 2;

/// Thresholds and collaborator budgets for one pipeline instance
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Balloon isolation box, per axis
    pub isolation_px: f64,
    /// Maximum balloon-to-token distance (exclusive)
    pub correlation_radius_px: f64,
    /// Ignore the token a balloon was detected from when correlating. When
    /// false, every parseable token is a candidate, so a bare numeral balloon
    /// matches itself as a linear dimension.
    pub skip_balloon_source: bool,
    /// Balloon confidence multiplier for scanned pages
    pub ocr_confidence_derate: f64,
    pub vector_std_dev_threshold: f64,
    /// When true, a std dev above the threshold means vector-based
    pub vector_when_above: bool,
    pub classify_dpi: u32,
    pub ocr_dpi: u32,
    pub raster_timeout: Duration,
    /// Per OCR attempt
    pub ocr_timeout: Duration,
    pub ocr_attempts: u32,
    /// Language hint passed to the OCR provider
    pub ocr_language: Option<String>,
    /// OCR words below this confidence (0-100) are dropped
    pub min_word_confidence: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            isolation_px: DEFAULT_ISOLATION_PX,
            correlation_radius_px: DEFAULT_CORRELATION_RADIUS_PX,
            skip_balloon_source: true,
            ocr_confidence_derate: DEFAULT_OCR_CONFIDENCE_DERATE,
            vector_std_dev_threshold: DEFAULT_VECTOR_STD_DEV_THRESHOLD,
            vector_when_above: true,
            classify_dpi: DEFAULT_CLASSIFY_DPI,
            ocr_dpi: DEFAULT_OCR_DPI,
            raster_timeout: Duration::from_secs(DEFAULT_RASTER_TIMEOUT_SECS),
            ocr_timeout: Duration::from_secs(DEFAULT_OCR_TIMEOUT_SECS),
            ocr_attempts: DEFAULT_OCR_ATTEMPTS,
            ocr_language: None,
            min_word_confidence: 0.0,
        }
    }
}

/// Pipeline progress, used for tracing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Start,
    Classified,
    TokensAcquired,
    BalloonsDetected,
    Correlated,
    Done,
    Failed,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Start => "start",
            Self::Classified => "classified",
            Self::TokensAcquired => "tokens_acquired",
            Self::BalloonsDetected => "balloons_detected",
            Self::Correlated => "correlated",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Single-page extraction pipeline. Holds no mutable state, so one instance
/// can serve concurrent pages.
pub struct Pipeline {
    classifier: PageClassifier,
    acquirer: TokenAcquirer,
    detector: BalloonDetector,
    correlator: Correlator,
    rasterizer_name: String,
    ocr_name: String,
}

impl Pipeline {
    pub fn new(
        config: PipelineConfig,
        rasterizer: Arc<dyn Rasterizer>,
        ocr: Arc<dyn OcrProviderTrait>,
    ) -> Self {
        Self {
            rasterizer_name: rasterizer.name().to_string(),
            ocr_name: ocr.provider_name().to_string(),
            classifier: PageClassifier::new(&config, rasterizer.clone()),
            acquirer: TokenAcquirer::new(&config, rasterizer, ocr),
            detector: BalloonDetector::new(&config),
            correlator: Correlator::new(&config),
        }
    }

    /// Rasterization collaborator identifier
    pub fn rasterizer_name(&self) -> &str {
        &self.rasterizer_name
    }

    /// OCR collaborator identifier
    pub fn ocr_name(&self) -> &str {
        &self.ocr_name
    }

    /// Process one page. Never fails; problems are reported in `errors`.
    #[tracing::instrument(skip_all, fields(page_bytes = page_bytes.len()))]
    pub async fn process_page(&self, page_bytes: &[u8]) -> ProcessingResult {
        let started = Instant::now();
        let mut errors = Vec::new();
        log_stage(PipelineStage::Start);

        let classification = self.classifier.classify(page_bytes).await;
        if let Some(warning) = classification.warning {
            tracing::warn!("{}", warning);
            errors.push(warning);
        }
        log_stage(PipelineStage::Classified);

        let tokens = match self.acquirer.acquire(page_bytes, &mut errors).await {
            Ok(tokens) => tokens,
            Err(e) => {
                tracing::error!("Token acquisition failed: {}", e);
                errors.push(e.to_string());
                log_stage(PipelineStage::Failed);
                return ProcessingResult::failed(errors, elapsed_ms(started));
            }
        };
        log_stage(PipelineStage::TokensAcquired);

        let source = TokenSource::from_vector_flag(classification.is_vector_based);
        let balloons = self.detector.detect(&tokens, source);
        log_stage(PipelineStage::BalloonsDetected);

        let dimensions = self.correlator.correlate(&tokens, &balloons);
        log_stage(PipelineStage::Correlated);

        let result = ProcessingResult {
            is_vector_based: classification.is_vector_based,
            page_count: 1,
            dimensions,
            balloons,
            text_items: tokens,
            processing_time_ms: elapsed_ms(started),
            errors,
        };
        log_stage(PipelineStage::Done);

        tracing::info!(
            "Processed page: {} tokens, {} balloons, {} matches in {}ms",
            result.text_items.len(),
            result.balloons.len(),
            result.dimensions.len(),
            result.processing_time_ms
        );
        result
    }
}

fn log_stage(stage: PipelineStage) {
    tracing::debug!(%stage, "pipeline stage");
}

/// Wall-clock milliseconds, rounded up
fn elapsed_ms(started: Instant) -> u64 {
    (started.elapsed().as_secs_f64() * 1000.0).ceil() as u64
}
